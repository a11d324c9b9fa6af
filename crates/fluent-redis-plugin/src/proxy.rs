//! Fluent Bit proxy-plugin definitions.
//!
//! These mirror `flb_plugin_proxy_def` and the return codes from
//! `fluent-bit/flb_output.h`. Fluent Bit treats the library as a Go-proxy
//! plugin, so the `proxy` field must say golang even though no Go runtime
//! is involved.

use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};

/// Flush result: unrecoverable, do not retry this chunk.
pub const FLB_ERROR: c_int = 0;
/// Flush result: chunk processed.
pub const FLB_OK: c_int = 1;
/// Flush result: try this chunk again later.
pub const FLB_RETRY: c_int = 2;

/// Proxy plugin type for output plugins.
pub const FLB_PROXY_OUTPUT_PLUGIN: c_int = 2;
/// Proxy kind for Go-ABI plugins.
pub const FLB_PROXY_GOLANG: c_int = 11;

/// Name Fluent Bit matches against `[OUTPUT] Name`.
const PLUGIN_NAME: &CStr = c"redis";
/// Human-readable description shown by `fluent-bit -h`.
const PLUGIN_DESCRIPTION: &CStr = c"Redis";

/// `struct flb_plugin_proxy_def` as laid out by Fluent Bit.
#[repr(C)]
#[derive(Debug)]
pub struct FlbPluginProxyDef {
    /// Plugin type (`FLB_PROXY_OUTPUT_PLUGIN`).
    pub plugin_type: c_int,
    /// Proxy kind (`FLB_PROXY_GOLANG`).
    pub proxy: c_int,
    /// Plugin flags.
    pub flags: c_int,
    /// Plugin name, owned by the host after registration.
    pub name: *mut c_char,
    /// Plugin description, owned by the host after registration.
    pub description: *mut c_char,
}

/// Fill a proxy definition for the `redis` output.
///
/// The name and description are heap strings; ownership passes to the host.
pub(crate) fn register(def: &mut FlbPluginProxyDef) {
    def.plugin_type = FLB_PROXY_OUTPUT_PLUGIN;
    def.proxy = FLB_PROXY_GOLANG;
    def.flags = 0;
    def.name = CString::from(PLUGIN_NAME).into_raw();
    def.description = CString::from(PLUGIN_DESCRIPTION).into_raw();
}

#[cfg(test)]
mod tests {
    use std::ptr;

    use super::*;

    #[test]
    fn register_fills_output_definition() {
        let mut def = FlbPluginProxyDef {
            plugin_type: 0,
            proxy: 0,
            flags: -1,
            name: ptr::null_mut(),
            description: ptr::null_mut(),
        };
        register(&mut def);

        assert_eq!(def.plugin_type, FLB_PROXY_OUTPUT_PLUGIN);
        assert_eq!(def.proxy, FLB_PROXY_GOLANG);
        assert_eq!(def.flags, 0);
        assert!(!def.name.is_null());
        assert!(!def.description.is_null());

        // SAFETY: produced by `CString::into_raw` in `register`, reclaimed once.
        let name = unsafe { CString::from_raw(def.name) };
        // SAFETY: as above.
        let description = unsafe { CString::from_raw(def.description) };
        assert_eq!(name.as_c_str(), PLUGIN_NAME);
        assert_eq!(description.as_c_str(), PLUGIN_DESCRIPTION);
    }
}
