use std::{ffi::c_void, ptr, sync::Arc};

use anyhow::{Result, anyhow};
use core_foundation::{base::*, number::*, string::*};
use core_graphics::display::*;
use tracing::error;

use super::{ActiveAppProbe, UNKNOWN_APP};

fn window_layer(dic_ref: CFDictionaryRef) -> Option<i32> {
    let layer_key = CFString::new("kCGWindowLayer");
    let mut layer_value: *const c_void = ptr::null();
    let has_layer = unsafe {
        CFDictionaryGetValueIfPresent(
            dic_ref,
            layer_key.as_concrete_TypeRef() as *const c_void,
            &mut layer_value,
        )
    } != 0;
    if !has_layer || layer_value.is_null() {
        return None;
    }

    let mut layer: i32 = 0;
    let got_layer = unsafe {
        CFNumberGetValue(
            layer_value as CFNumberRef,
            kCFNumberIntType,
            &mut layer as *mut i32 as *mut c_void,
        )
    };
    got_layer.then_some(layer)
}

fn window_owner_name(dic_ref: CFDictionaryRef) -> Option<String> {
    let owner_key = CFString::new("kCGWindowOwnerName");
    let mut owner_value: *const c_void = ptr::null();
    let has_owner = unsafe {
        CFDictionaryGetValueIfPresent(
            dic_ref,
            owner_key.as_concrete_TypeRef() as *const c_void,
            &mut owner_value,
        )
    } != 0;
    if !has_owner || owner_value.is_null() {
        return None;
    }

    let cf_str: CFString = unsafe { CFString::wrap_under_get_rule(owner_value as CFStringRef) };
    Some(cf_str.to_string())
}

/// Walks the on-screen window list front to back and reports the owner of the
/// first layer-0 window, which is the application owning the focused window.
pub fn get_active_app() -> Result<String> {
    let options: CGWindowListOption =
        kCGWindowListOptionOnScreenOnly | kCGWindowListExcludeDesktopElements;
    let window_list_info = unsafe { CGWindowListCopyWindowInfo(options, kCGNullWindowID) };
    if window_list_info.is_null() {
        return Err(anyhow!("Failed to copy the window list"));
    }

    let mut active_app = None;
    let count = unsafe { CFArrayGetCount(window_list_info) };
    for i in 0..count {
        let dic_ref =
            unsafe { CFArrayGetValueAtIndex(window_list_info, i as isize) as CFDictionaryRef };
        if dic_ref.is_null() {
            continue;
        }

        if window_layer(dic_ref) == Some(0) {
            active_app = window_owner_name(dic_ref);
            break;
        }
    }

    unsafe { CFRelease(window_list_info as CFTypeRef) };

    // No layer-0 window is an unknown state rather than a failure.
    Ok(active_app.unwrap_or_else(|| UNKNOWN_APP.to_string()))
}

pub struct MacProbe {}

impl MacProbe {
    pub fn new() -> Self {
        Self {}
    }
}

impl Default for MacProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl ActiveAppProbe for MacProbe {
    fn current_app(&mut self) -> Result<Arc<str>> {
        get_active_app()
            .map(Into::into)
            .inspect_err(|e| error!("Failed to get active application {e:?}"))
    }
}
