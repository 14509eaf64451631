//! C ABI over [`LSystem`] sessions.
//!
//! Sessions live in a process-wide [`HandleTable`] and are addressed by
//! `u64` handles. Strings produced by the library are copied into
//! caller-owned buffers: `len_out` always receives the byte length of the
//! result (without the trailing NUL), and if `cap` cannot hold it plus the
//! NUL nothing is written and `BufferTooSmall` is returned so the caller
//! can retry with a larger buffer.

use crate::error::{Error, MeshError, RuleError, TurtleError};
use crate::handle::HandleTable;
use crate::interpreter::TurtleConfig;
use crate::mesh::MeshConfig;
use crate::system::{LSystem, ProcessOptions};
use glam::Vec3;
use std::ffi::{CStr, c_char};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

static SYSTEMS: Mutex<HandleTable<LSystem>> = Mutex::new(HandleTable::new());

/// Status code returned by every exported function.
///
/// `Ok` = 0, errors are negative. Values are ABI-stable.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyslStatus {
    Ok = 0,
    /// Handle is invalid or was already destroyed.
    InvalidHandle = -1,
    /// A pointer is null or a string is not valid UTF-8.
    InvalidArgument = -2,
    /// Rule expression has no `=`.
    InvalidRuleFormat = -3,
    /// `]` without a matching `[`.
    StackUnderflow = -4,
    /// Rings could not be stitched.
    MeshError = -5,
    /// Caller-provided buffer is too small; `len_out` holds the needed length.
    BufferTooSmall = -6,
    /// Poisoned lock or serialization failure.
    InternalError = -7,
    /// A Rust panic was caught at the boundary.
    Panicked = -128,
}

impl From<&RuleError> for SyslStatus {
    fn from(e: &RuleError) -> Self {
        match e {
            RuleError::InvalidRuleFormat { .. } => Self::InvalidRuleFormat,
        }
    }
}

impl From<&TurtleError> for SyslStatus {
    fn from(e: &TurtleError) -> Self {
        match e {
            TurtleError::StackUnderflow { .. } => Self::StackUnderflow,
        }
    }
}

impl From<&MeshError> for SyslStatus {
    fn from(_e: &MeshError) -> Self {
        Self::MeshError
    }
}

impl From<&Error> for SyslStatus {
    fn from(e: &Error) -> Self {
        match e {
            Error::Rule(e) => e.into(),
            Error::Turtle(e) => e.into(),
            Error::Mesh(e) => e.into(),
        }
    }
}

/// Runs `f`, turning panics into [`SyslStatus::Panicked`].
fn guard(f: impl FnOnce() -> Result<(), SyslStatus>) -> i32 {
    let status = match catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(())) => SyslStatus::Ok,
        Ok(Err(status)) => status,
        Err(_) => SyslStatus::Panicked,
    };
    if status != SyslStatus::Ok {
        warn!(?status, "sysl call failed");
    }
    status as i32
}

fn systems() -> Result<MutexGuard<'static, HandleTable<LSystem>>, SyslStatus> {
    SYSTEMS.lock().map_err(|_| SyslStatus::InternalError)
}

fn with_system<R>(
    handle: u64,
    f: impl FnOnce(&mut LSystem) -> Result<R, SyslStatus>,
) -> Result<R, SyslStatus> {
    let mut table = systems()?;
    let system = table.get_mut(handle).ok_or(SyslStatus::InvalidHandle)?;
    f(system)
}

/// Borrows a NUL-terminated UTF-8 string from the caller.
fn read_str<'a>(ptr: *const c_char) -> Result<&'a str, SyslStatus> {
    if ptr.is_null() {
        return Err(SyslStatus::InvalidArgument);
    }
    // SAFETY: ptr is non-null and NUL-terminated per caller contract.
    let s = unsafe { CStr::from_ptr(ptr) };
    s.to_str().map_err(|_| SyslStatus::InvalidArgument)
}

/// Copies `text` plus a trailing NUL into `buf`.
fn write_str(text: &str, buf: *mut u8, cap: usize, len_out: *mut usize) -> Result<(), SyslStatus> {
    if len_out.is_null() {
        return Err(SyslStatus::InvalidArgument);
    }
    let len = text.len();
    // SAFETY: len_out is non-null and writable per caller contract.
    unsafe { *len_out = len };
    if cap <= len {
        return Err(SyslStatus::BufferTooSmall);
    }
    if buf.is_null() {
        return Err(SyslStatus::InvalidArgument);
    }
    // SAFETY: buf points to at least cap > len writable bytes.
    let out = unsafe { std::slice::from_raw_parts_mut(buf, len + 1) };
    out[..len].copy_from_slice(text.as_bytes());
    out[len] = 0;
    Ok(())
}

/// Creates an empty session and writes its handle to `handle_out`.
#[unsafe(no_mangle)]
pub extern "C" fn sysl_system_create(handle_out: *mut u64) -> i32 {
    guard(|| {
        if handle_out.is_null() {
            return Err(SyslStatus::InvalidArgument);
        }
        let handle = systems()?.insert(LSystem::new());
        debug!(handle, "system created");
        // SAFETY: handle_out is non-null and writable per caller contract.
        unsafe { *handle_out = handle };
        Ok(())
    })
}

/// Destroys a session. Destroying twice returns `InvalidHandle`.
#[unsafe(no_mangle)]
pub extern "C" fn sysl_system_destroy(handle: u64) -> i32 {
    guard(|| {
        systems()?
            .remove(handle)
            .ok_or(SyslStatus::InvalidHandle)?;
        debug!(handle, "system destroyed");
        Ok(())
    })
}

/// Adds a `<name>=<body>` rule. An existing rule of the same name is kept.
#[unsafe(no_mangle)]
pub extern "C" fn sysl_add_rule(handle: u64, expression: *const c_char) -> i32 {
    guard(|| {
        let expression = read_str(expression)?;
        with_system(handle, |system| {
            system
                .add_rule(expression)
                .map_err(|e| SyslStatus::from(&e))
        })
    })
}

/// Removes the rule called `name`; unknown names are not an error.
#[unsafe(no_mangle)]
pub extern "C" fn sysl_remove_rule(handle: u64, name: *const c_char) -> i32 {
    guard(|| {
        let name = read_str(name)?;
        with_system(handle, |system| {
            system.remove_rule(name);
            Ok(())
        })
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn sysl_clear_rules(handle: u64) -> i32 {
    guard(|| {
        with_system(handle, |system| {
            system.clear_rules();
            Ok(())
        })
    })
}

/// Rewrites `seed` `iterations` times and copies the result into `buf`.
#[unsafe(no_mangle)]
pub extern "C" fn sysl_generate_axiom(
    handle: u64,
    seed: *const c_char,
    iterations: u32,
    buf: *mut u8,
    cap: usize,
    len_out: *mut usize,
) -> i32 {
    guard(|| {
        let seed = read_str(seed)?;
        let axiom = with_system(handle, |system| Ok(system.generate_axiom(seed, iterations)))?;
        write_str(&axiom, buf, cap, len_out)
    })
}

/// Generates, walks from the origin, and copies the geometry as JSON into `buf`.
///
/// With `segments == 0` no mesh is built; otherwise every walked point gets
/// a ring of `segments` vertices and the given `radius`.
#[unsafe(no_mangle)]
#[allow(clippy::too_many_arguments)]
pub extern "C" fn sysl_process_axiom(
    handle: u64,
    seed: *const c_char,
    iterations: u32,
    angle_degrees: f32,
    radius: f32,
    segments: u32,
    buf: *mut u8,
    cap: usize,
    len_out: *mut usize,
) -> i32 {
    guard(|| {
        let seed = read_str(seed)?;
        let options = ProcessOptions {
            iterations,
            turtle: TurtleConfig::new(Vec3::ZERO, angle_degrees),
            mesh: (segments > 0).then_some(MeshConfig {
                radius,
                segments,
                ..Default::default()
            }),
        };
        let geometry = with_system(handle, |system| {
            system
                .process(seed, &options)
                .map_err(|e| SyslStatus::from(&e))
        })?;
        let json = geometry.to_json().map_err(|_| SyslStatus::InternalError)?;
        write_str(&json, buf, cap, len_out)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    fn create() -> u64 {
        let mut handle = 0;
        assert_eq!(sysl_system_create(&mut handle), SyslStatus::Ok as i32);
        handle
    }

    fn add(handle: u64, expr: &str) -> i32 {
        let expr = CString::new(expr).unwrap();
        sysl_add_rule(handle, expr.as_ptr())
    }

    fn generate(handle: u64, seed: &str, iterations: u32) -> Result<String, i32> {
        let seed = CString::new(seed).unwrap();
        let mut buf = vec![0u8; 256];
        let mut len = 0usize;
        let status = sysl_generate_axiom(
            handle,
            seed.as_ptr(),
            iterations,
            buf.as_mut_ptr(),
            buf.len(),
            &mut len,
        );
        if status != SyslStatus::Ok as i32 {
            return Err(status);
        }
        buf.truncate(len);
        Ok(String::from_utf8(buf).unwrap())
    }

    #[test]
    fn status_code_values_are_stable() {
        assert_eq!(SyslStatus::Ok as i32, 0);
        assert_eq!(SyslStatus::InvalidHandle as i32, -1);
        assert_eq!(SyslStatus::InvalidArgument as i32, -2);
        assert_eq!(SyslStatus::InvalidRuleFormat as i32, -3);
        assert_eq!(SyslStatus::StackUnderflow as i32, -4);
        assert_eq!(SyslStatus::MeshError as i32, -5);
        assert_eq!(SyslStatus::BufferTooSmall as i32, -6);
        assert_eq!(SyslStatus::InternalError as i32, -7);
        assert_eq!(SyslStatus::Panicked as i32, -128);
    }

    #[test]
    fn rules_and_generation_round_trip_through_handles() {
        let h = create();
        assert_eq!(add(h, "A=AB"), 0);
        assert_eq!(add(h, "B=A"), 0);
        assert_eq!(generate(h, "A", 2).unwrap(), "AAAA");

        let name = CString::new("A").unwrap();
        assert_eq!(sysl_remove_rule(h, name.as_ptr()), 0);
        assert_eq!(generate(h, "A", 1).unwrap(), "A");

        assert_eq!(sysl_clear_rules(h), 0);
        assert_eq!(generate(h, "B", 1).unwrap(), "B");
        assert_eq!(sysl_system_destroy(h), 0);
    }

    #[test]
    fn malformed_rule_is_reported() {
        let h = create();
        assert_eq!(
            add(h, "noequalsign"),
            SyslStatus::InvalidRuleFormat as i32
        );
        sysl_system_destroy(h);
    }

    #[test]
    fn destroyed_handle_is_rejected() {
        let h = create();
        assert_eq!(sysl_system_destroy(h), 0);
        assert_eq!(
            sysl_system_destroy(h),
            SyslStatus::InvalidHandle as i32
        );
        assert_eq!(add(h, "A=B"), SyslStatus::InvalidHandle as i32);
    }

    #[test]
    fn small_buffer_reports_required_length() {
        let h = create();
        add(h, "F=FF");
        let seed = CString::new("F").unwrap();
        let mut buf = [0u8; 4];
        let mut len = 0usize;
        let status =
            sysl_generate_axiom(h, seed.as_ptr(), 2, buf.as_mut_ptr(), buf.len(), &mut len);
        assert_eq!(status, SyslStatus::BufferTooSmall as i32);
        assert_eq!(len, 4);
        assert_eq!(buf, [0; 4]);

        let mut buf = vec![0u8; len + 1];
        let status =
            sysl_generate_axiom(h, seed.as_ptr(), 2, buf.as_mut_ptr(), buf.len(), &mut len);
        assert_eq!(status, 0);
        assert_eq!(&buf, b"FFFF\0");
        sysl_system_destroy(h);
    }

    #[test]
    fn null_pointers_are_invalid_arguments() {
        assert_eq!(
            sysl_system_create(std::ptr::null_mut()),
            SyslStatus::InvalidArgument as i32
        );
        let h = create();
        assert_eq!(
            sysl_add_rule(h, std::ptr::null()),
            SyslStatus::InvalidArgument as i32
        );
        sysl_system_destroy(h);
    }

    #[test]
    fn process_axiom_returns_json_geometry() {
        let h = create();
        add(h, "X=F[F]F");
        let seed = CString::new("X").unwrap();
        let mut buf = vec![0u8; 4096];
        let mut len = 0usize;
        let status = sysl_process_axiom(
            h,
            seed.as_ptr(),
            1,
            90.0,
            0.1,
            4,
            buf.as_mut_ptr(),
            buf.len(),
            &mut len,
        );
        assert_eq!(status, 0);
        buf.truncate(len);
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["axiom"], "F[F]F");
        assert_eq!(value["points"].as_array().unwrap().len(), 4);
        assert_eq!(value["mesh"]["indices"].as_array().unwrap().len(), 3 * 4 * 4);
        sysl_system_destroy(h);
    }

    #[test]
    fn process_axiom_reports_underflow() {
        let h = create();
        let seed = CString::new("F]").unwrap();
        let mut buf = vec![0u8; 64];
        let mut len = 0usize;
        let status = sysl_process_axiom(
            h,
            seed.as_ptr(),
            0,
            45.0,
            0.0,
            0,
            buf.as_mut_ptr(),
            buf.len(),
            &mut len,
        );
        assert_eq!(status, SyslStatus::StackUnderflow as i32);
        sysl_system_destroy(h);
    }
}
