//! Fixed mnemonic tables and host path resolution.
//!
//! Stream variables live under two sub-trees of a stream node: `Output` for
//! calculated results and `Input` for specifications. Each mnemonic maps to a
//! fixed path fragment inside one of them. Composition mnemonics are further
//! qualified by the component id, appended as a last path segment:
//!
//! ```
//! use ap_core::{PropertyKey, ReadProperty, resolve_path};
//!
//! let key = PropertyKey::from(("COMPMOLEFLOW", "CO2"));
//! let path = resolve_path::<ReadProperty>(&key).unwrap();
//! assert_eq!(path, r"Output\MOLEFLOW\MIXED\CO2");
//! ```

use crate::error::{ApError, ApResult};
use crate::key::PropertyKey;
use std::str::FromStr;

/// Separator between variable tree path segments.
pub const PATH_SEPARATOR: char = '\\';

/// A table of mnemonics for one access direction.
pub trait Mnemonic: Copy + FromStr + 'static {
    /// Sub-tree of the stream node the fragments are relative to.
    const ROOT: &'static str;

    /// Every member of the table.
    const ALL: &'static [Self];

    /// Mnemonic text, e.g. `TEMP`.
    fn key(&self) -> &'static str;

    /// Path fragment under [`Mnemonic::ROOT`].
    fn path_fragment(&self) -> &'static str;

    /// Whether the mnemonic is meant to be qualified by a component.
    fn takes_component(&self) -> bool;

    /// Full path relative to the stream node.
    fn path(&self, component: Option<&str>) -> String {
        let mut path = format!("{}{}{}", Self::ROOT, PATH_SEPARATOR, self.path_fragment());
        if let Some(c) = component {
            path.push(PATH_SEPARATOR);
            path.push_str(c);
        }
        path
    }
}

/// Resolve a caller key against table `M`.
///
/// Fails with [`ApError::UnknownKey`] if the mnemonic is not a member of `M`.
pub fn resolve_path<M: Mnemonic>(key: &PropertyKey) -> ApResult<String> {
    let mnemonic = M::from_str(key.mnemonic()).map_err(|_| ApError::UnknownKey {
        key: key.to_string(),
    })?;
    Ok(mnemonic.path(key.component()))
}

/// Calculated stream results (read direction).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadProperty {
    /// Temperature
    Temperature,
    /// Pressure
    Pressure,
    /// Total molar flow
    MoleFlow,
    /// Molar flow of one component
    CompMoleFlow,
    /// Total mass flow
    MassFlow,
    /// Mass flow of one component
    CompMassFlow,
    /// Mole fraction of one component
    CompMoleFrac,
    /// Mass fraction of one component
    CompMassFrac,
    /// Total volumetric flow
    VolumetricFlow,
    /// Enthalpy per unit mass
    MassEnthalpy,
    /// Enthalpy per mole
    MoleEnthalpy,
}

impl Mnemonic for ReadProperty {
    const ROOT: &'static str = "Output";

    const ALL: &'static [Self] = &[
        ReadProperty::Temperature,
        ReadProperty::Pressure,
        ReadProperty::MoleFlow,
        ReadProperty::CompMoleFlow,
        ReadProperty::MassFlow,
        ReadProperty::CompMassFlow,
        ReadProperty::CompMoleFrac,
        ReadProperty::CompMassFrac,
        ReadProperty::VolumetricFlow,
        ReadProperty::MassEnthalpy,
        ReadProperty::MoleEnthalpy,
    ];

    fn key(&self) -> &'static str {
        match self {
            ReadProperty::Temperature => "TEMP",
            ReadProperty::Pressure => "PRES",
            ReadProperty::MoleFlow => "MOLEFLOW",
            ReadProperty::CompMoleFlow => "COMPMOLEFLOW",
            ReadProperty::MassFlow => "MASSFLOW",
            ReadProperty::CompMassFlow => "COMPMASSFLOW",
            ReadProperty::CompMoleFrac => "COMPMOLEFRAC",
            ReadProperty::CompMassFrac => "COMPMASSFRAC",
            ReadProperty::VolumetricFlow => "VOLUMETRICFLOW",
            ReadProperty::MassEnthalpy => "MASSENTHALPY",
            ReadProperty::MoleEnthalpy => "MOLEENTHALPY",
        }
    }

    fn path_fragment(&self) -> &'static str {
        match self {
            ReadProperty::Temperature => r"TEMP_OUT\MIXED",
            ReadProperty::Pressure => r"PRES_OUT\MIXED",
            ReadProperty::MoleFlow => r"MOLEFLMX\MIXED",
            ReadProperty::CompMoleFlow => r"MOLEFLOW\MIXED",
            ReadProperty::MassFlow => r"MASSFLMX\MIXED",
            ReadProperty::CompMassFlow => r"MASSFLOW\MIXED",
            ReadProperty::CompMoleFrac => r"MOLEFRAC\MIXED",
            ReadProperty::CompMassFrac => r"MASSFRAC\MIXED",
            ReadProperty::VolumetricFlow => r"VOLFLMX\MIXED",
            ReadProperty::MassEnthalpy => r"HMX_MASS\MIXED",
            ReadProperty::MoleEnthalpy => r"HMX\MIXED",
        }
    }

    fn takes_component(&self) -> bool {
        matches!(
            self,
            ReadProperty::CompMoleFlow
                | ReadProperty::CompMassFlow
                | ReadProperty::CompMoleFrac
                | ReadProperty::CompMassFrac
        )
    }
}

impl FromStr for ReadProperty {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReadProperty::ALL
            .iter()
            .copied()
            .find(|p| p.key() == s)
            .ok_or("unknown read property")
    }
}

/// Stream specifications (write direction).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WriteProperty {
    /// Temperature
    Temperature,
    /// Pressure
    Pressure,
    /// Total flow, on the basis given by `FLOWBASIS`
    Flow,
    /// `MASS`, `MOLE`, `STDVOL` or `VOLUME`
    FlowBasis,
    /// Flow of one component, on the basis given by `COMPBASIS`
    CompFlow,
    /// `MASS-FLOW`, `MOLE-FLOW`, `STDVOL-FLOW`, `MASS-FRAC`, `MOLE-FRAC`,
    /// `STDVOL-FRAC`, `MASS-CONC` or `MOLE-CONC`
    CompBasis,
    /// Vapor fraction
    VapFrac,
    /// State variables the stream is specified by: `TP`, `TV` or `PV`
    FlashType,
}

impl Mnemonic for WriteProperty {
    const ROOT: &'static str = "Input";

    const ALL: &'static [Self] = &[
        WriteProperty::Temperature,
        WriteProperty::Pressure,
        WriteProperty::Flow,
        WriteProperty::FlowBasis,
        WriteProperty::CompFlow,
        WriteProperty::CompBasis,
        WriteProperty::VapFrac,
        WriteProperty::FlashType,
    ];

    fn key(&self) -> &'static str {
        match self {
            WriteProperty::Temperature => "TEMP",
            WriteProperty::Pressure => "PRES",
            WriteProperty::Flow => "FLOW",
            WriteProperty::FlowBasis => "FLOWBASIS",
            WriteProperty::CompFlow => "COMPFLOW",
            WriteProperty::CompBasis => "COMPBASIS",
            WriteProperty::VapFrac => "VAPFRAC",
            WriteProperty::FlashType => "FLASHTYPE",
        }
    }

    fn path_fragment(&self) -> &'static str {
        match self {
            WriteProperty::Temperature => r"TEMP\MIXED",
            WriteProperty::Pressure => r"PRES\MIXED",
            WriteProperty::Flow => r"TOTFLOW\MIXED",
            WriteProperty::FlowBasis => r"FLOWBASE\MIXED",
            WriteProperty::CompFlow => r"FLOW\MIXED",
            WriteProperty::CompBasis => r"BASIS\MIXED",
            WriteProperty::VapFrac => r"VFRAC\MIXED",
            WriteProperty::FlashType => r"MIXED_SPEC\MIXED",
        }
    }

    fn takes_component(&self) -> bool {
        matches!(self, WriteProperty::CompFlow)
    }
}

impl FromStr for WriteProperty {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WriteProperty::ALL
            .iter()
            .copied()
            .find(|p| p.key() == s)
            .ok_or("unknown write property")
    }
}
