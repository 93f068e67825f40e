// Raw FFI bindings to the C native probe.
use std::os::raw::{c_char, c_int};

unsafe extern "C" {
    pub fn ocb_probe_stdio(out_text: *const c_char, err_text: *const c_char) -> c_int;

    pub fn ocb_probe_raw(fd: c_int, text: *const c_char, len: usize) -> c_int;
}
