//! COM automation host.
//!
//! The host application registers a document class under a ProgID. Everything
//! is late bound through `IDispatch`: member names are resolved at call time,
//! the way scripting clients drive the application.
//!
//! On platforms without COM the types still exist so that callers compile,
//! but [`ComServer::connect`] always fails with [`HostError::Unavailable`].

use crate::error::{HostError, HostResult};
use crate::server::{AutomationServer, HostNode};
use ap_core::Value;
use std::path::Path;

/// ProgID of the host's document automation class.
pub const DEFAULT_PROG_ID: &str = "Apwn.Document";

#[cfg(windows)]
pub use dispatch::{ComNode, ComServer};
#[cfg(not(windows))]
pub use unsupported::{ComNode, ComServer};

#[cfg(windows)]
mod dispatch {
    use super::*;
    use tracing::debug;
    use windows::Win32::System::Com::{
        CLSCTX_LOCAL_SERVER, CLSIDFromProgID, COINIT_APARTMENTTHREADED, CoCreateInstance,
        CoInitializeEx, CoUninitialize, DISPATCH_FLAGS, DISPATCH_METHOD, DISPATCH_PROPERTYGET,
        DISPATCH_PROPERTYPUT, DISPPARAMS, IDispatch,
    };
    use windows::core::{BSTR, GUID, HSTRING, IUnknown, Interface, PCWSTR, VARIANT};

    const LOCALE_USER_DEFAULT: u32 = 0x0400;
    const DISPID_PROPERTYPUT: i32 = -3;

    /// Keeps COM initialized on this thread for as long as the server lives.
    struct Apartment;

    impl Apartment {
        fn enter() -> HostResult<Self> {
            unsafe { CoInitializeEx(None, COINIT_APARTMENTTHREADED) }
                .ok()
                .map_err(|e| HostError::Unavailable {
                    message: format!("COM initialization failed: {}", e),
                })?;
            Ok(Self)
        }
    }

    impl Drop for Apartment {
        fn drop(&mut self) {
            unsafe { CoUninitialize() };
        }
    }

    fn invoke(
        target: &IDispatch,
        member: &'static str,
        flags: DISPATCH_FLAGS,
        args: &[VARIANT],
    ) -> HostResult<VARIANT> {
        let fail = |e: windows::core::Error| HostError::Call {
            member,
            message: e.to_string(),
        };

        let name = HSTRING::from(member);
        let names = [PCWSTR(name.as_ptr())];
        let mut dispid = 0;
        unsafe {
            target.GetIDsOfNames(
                &GUID::zeroed(),
                names.as_ptr(),
                1,
                LOCALE_USER_DEFAULT,
                &mut dispid,
            )
        }
        .map_err(fail)?;

        // Positional arguments travel last-to-first.
        let mut args: Vec<VARIANT> = args.iter().rev().cloned().collect();
        let put = flags == DISPATCH_PROPERTYPUT;
        let mut named = DISPID_PROPERTYPUT;
        let params = DISPPARAMS {
            rgvarg: args.as_mut_ptr(),
            rgdispidNamedArgs: if put {
                &mut named
            } else {
                std::ptr::null_mut()
            },
            cArgs: args.len() as u32,
            cNamedArgs: u32::from(put),
        };

        let mut result = VARIANT::default();
        unsafe {
            target.Invoke(
                dispid,
                &GUID::zeroed(),
                LOCALE_USER_DEFAULT,
                flags,
                &params,
                &mut result,
                std::ptr::null_mut(),
                std::ptr::null_mut(),
            )
        }
        .map_err(fail)?;
        Ok(result)
    }

    fn get(target: &IDispatch, member: &'static str, args: &[VARIANT]) -> HostResult<VARIANT> {
        invoke(target, member, DISPATCH_METHOD | DISPATCH_PROPERTYGET, args)
    }

    fn call(target: &IDispatch, member: &'static str, args: &[VARIANT]) -> HostResult<()> {
        invoke(target, member, DISPATCH_METHOD, args).map(|_| ())
    }

    fn put(target: &IDispatch, member: &'static str, value: VARIANT) -> HostResult<()> {
        invoke(target, member, DISPATCH_PROPERTYPUT, &[value]).map(|_| ())
    }

    fn text(s: &str) -> VARIANT {
        VARIANT::from(BSTR::from(s))
    }

    /// `None` for empty, null, or non-dispatch results (e.g. `FindNode` misses).
    fn dispatch_of(v: &VARIANT) -> Option<IDispatch> {
        if v.is_empty() {
            return None;
        }
        IUnknown::try_from(v).ok()?.cast::<IDispatch>().ok()
    }

    fn to_variant(value: &Value) -> VARIANT {
        match value {
            Value::Int(i) => match i32::try_from(*i) {
                Ok(i) => VARIANT::from(i),
                Err(_) => VARIANT::from(*i as f64),
            },
            Value::Real(x) => VARIANT::from(*x),
            Value::Text(s) => text(s),
            Value::Empty => VARIANT::default(),
        }
    }

    fn from_variant(v: &VARIANT) -> Value {
        if v.is_empty() {
            return Value::Empty;
        }
        if let Ok(x) = f64::try_from(v) {
            return Value::Real(x);
        }
        match BSTR::try_from(v) {
            Ok(s) => Value::Text(s.to_string()),
            Err(_) => Value::Empty,
        }
    }

    /// A node of the host's variable tree (`IHNode`).
    #[derive(Clone)]
    pub struct ComNode {
        disp: IDispatch,
    }

    impl HostNode for ComNode {
        fn element(&self, name: &str) -> HostResult<Option<Self>> {
            let elements = get(&self.disp, "Elements", &[])?;
            let Some(collection) = dispatch_of(&elements) else {
                return Ok(None);
            };
            // The collection raises for unknown names instead of returning nothing.
            match get(&collection, "Item", &[text(name)]) {
                Ok(item) => Ok(dispatch_of(&item).map(|disp| ComNode { disp })),
                Err(e) => {
                    debug!(name, error = %e, "element lookup failed");
                    Ok(None)
                }
            }
        }

        fn find_node(&self, path: &str) -> HostResult<Option<Self>> {
            let found = get(&self.disp, "FindNode", &[text(path)])?;
            Ok(dispatch_of(&found).map(|disp| ComNode { disp }))
        }

        fn value(&self) -> HostResult<Value> {
            get(&self.disp, "Value", &[]).map(|v| from_variant(&v))
        }

        fn set_value(&self, value: &Value) -> HostResult<()> {
            put(&self.disp, "Value", to_variant(value))
        }
    }

    /// The host application's document automation object.
    pub struct ComServer {
        app: IDispatch,
        _apartment: Apartment,
    }

    impl ComServer {
        /// Create a new automation server instance for `prog_id`.
        pub fn connect(prog_id: &str) -> HostResult<Self> {
            let apartment = Apartment::enter()?;
            let unavailable = |e: windows::core::Error| HostError::Unavailable {
                message: format!("{}: {}", prog_id, e),
            };
            let clsid = unsafe { CLSIDFromProgID(&HSTRING::from(prog_id)) }.map_err(unavailable)?;
            let app: IDispatch =
                unsafe { CoCreateInstance(&clsid, None, CLSCTX_LOCAL_SERVER) }.map_err(unavailable)?;
            debug!(prog_id, "automation server created");
            Ok(Self {
                app,
                _apartment: apartment,
            })
        }
    }

    impl AutomationServer for ComServer {
        type Node = ComNode;

        fn load_document(&self, path: &Path) -> HostResult<()> {
            let arg = text(&path.to_string_lossy());
            call(&self.app, "InitFromArchive2", &[arg]).map_err(|e| HostError::Load {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
        }

        fn set_visible(&self, visible: bool) -> HostResult<()> {
            put(&self.app, "Visible", VARIANT::from(i32::from(visible)))
        }

        fn set_suppress_dialogs(&self, suppress: bool) -> HostResult<()> {
            put(&self.app, "SuppressDialogs", VARIANT::from(suppress))
        }

        fn run(&self) -> HostResult<()> {
            call(&self.app, "Run", &[])
        }

        fn reinit(&self) -> HostResult<()> {
            call(&self.app, "Reinit", &[])
        }

        fn close_document(&self, path: &Path) -> HostResult<()> {
            call(&self.app, "Close", &[text(&path.to_string_lossy())])
        }

        fn quit(&self) -> HostResult<()> {
            call(&self.app, "Quit", &[])
        }

        fn tree(&self) -> HostResult<ComNode> {
            let tree = get(&self.app, "Tree", &[])?;
            dispatch_of(&tree)
                .map(|disp| ComNode { disp })
                .ok_or(HostError::Call {
                    member: "Tree",
                    message: "document has no variable tree".to_string(),
                })
        }
    }
}

#[cfg(not(windows))]
mod unsupported {
    use super::*;
    use std::convert::Infallible;

    /// Placeholder: COM automation only exists on Windows.
    #[derive(Clone)]
    pub struct ComNode {
        never: Infallible,
    }

    /// Placeholder: COM automation only exists on Windows.
    pub struct ComServer {
        never: Infallible,
    }

    impl ComServer {
        pub fn connect(prog_id: &str) -> HostResult<Self> {
            Err(HostError::Unavailable {
                message: format!("{}: COM automation is only available on Windows", prog_id),
            })
        }
    }

    impl HostNode for ComNode {
        fn element(&self, _name: &str) -> HostResult<Option<Self>> {
            match self.never {}
        }

        fn find_node(&self, _path: &str) -> HostResult<Option<Self>> {
            match self.never {}
        }

        fn value(&self) -> HostResult<Value> {
            match self.never {}
        }

        fn set_value(&self, _value: &Value) -> HostResult<()> {
            match self.never {}
        }
    }

    impl AutomationServer for ComServer {
        type Node = ComNode;

        fn load_document(&self, _path: &Path) -> HostResult<()> {
            match self.never {}
        }

        fn set_visible(&self, _visible: bool) -> HostResult<()> {
            match self.never {}
        }

        fn set_suppress_dialogs(&self, _suppress: bool) -> HostResult<()> {
            match self.never {}
        }

        fn run(&self) -> HostResult<()> {
            match self.never {}
        }

        fn reinit(&self) -> HostResult<()> {
            match self.never {}
        }

        fn close_document(&self, _path: &Path) -> HostResult<()> {
            match self.never {}
        }

        fn quit(&self) -> HostResult<()> {
            match self.never {}
        }

        fn tree(&self) -> HostResult<ComNode> {
            match self.never {}
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn connect_reports_unavailable() {
            let err = ComServer::connect(DEFAULT_PROG_ID).err().unwrap();
            assert!(matches!(err, HostError::Unavailable { .. }));
            assert!(err.to_string().contains("Apwn.Document"));
        }
    }
}
