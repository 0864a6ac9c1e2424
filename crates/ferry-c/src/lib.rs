// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # Ferry C FFI bindings
//!
//! C-compatible surface over the ferry marshaling core, consumed by the
//! generated managed-side bindings: runtime/context lifecycle, the opaque
//! handle protocol, wire-buffer ownership handoff, and logging init.
//!
//! Per-type marshal entry points are emitted by the code generator against
//! the Rust API; this crate carries only the runtime primitives every
//! generated binding needs.
//!
//! # Safety
//!
//! All public functions are `unsafe` and require the caller to uphold the
//! invariants documented in each function's safety comment.

mod buffer;
mod logging;

pub use buffer::{ferry_buffer_free, FerryBuffer};
pub use logging::{ferry_logging_init, FerryLogLevel};

use std::ffi::CStr;
use std::os::raw::{c_char, c_void};
use std::ptr;
use std::sync::Arc;

use ferry::{
    BoundaryContext, Error, HandleId, HandleRegistry, Side, TypeDescriptor, TypeRegistry, Value,
};

// =============================================================================
// Error codes
// =============================================================================

/// Error codes returned by every fallible ferry FFI call.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FerryError {
    /// Operation completed successfully
    FerryOk = 0,
    /// Invalid argument provided (null pointer, invalid value)
    FerryInvalidArgument = 1,
    /// Generic operation failure
    FerryOperationFailed = 2,

    // === Registration errors (10-19) ===
    /// Type already registered under a different shape
    FerryRegistrationConflict = 10,
    /// Type was never registered
    FerryUnregisteredType = 11,
    /// Descriptor rejected at registration
    FerryInvalidDescriptor = 12,

    // === Codec errors (20-29) ===
    /// Discriminant outside the registered mapping
    FerryUnknownDiscriminant = 20,
    /// Variant payload disagrees with its declared shape
    FerryPayloadShapeMismatch = 21,
    /// Collection length header disagrees with transmitted elements
    FerryLengthMismatch = 22,
    /// Value does not match its descriptor
    FerryTypeMismatch = 23,
    /// Wire data ended before the declared contents
    FerryBufferTooSmall = 24,
    /// Malformed payload data
    FerryInvalidData = 25,

    // === Handle lifecycle errors (30-39) ===
    /// Handle resolved or released after release
    FerryUseAfterRelease = 30,
    /// Release attempted by a side that does not own the handle
    FerryOwnershipViolation = 31,
}

impl From<&Error> for FerryError {
    fn from(e: &Error) -> Self {
        match e {
            Error::RegistrationConflict(_) => Self::FerryRegistrationConflict,
            Error::UnregisteredType(_) => Self::FerryUnregisteredType,
            Error::InvalidDescriptor { .. } => Self::FerryInvalidDescriptor,
            Error::UnknownDiscriminant { .. } => Self::FerryUnknownDiscriminant,
            Error::PayloadShapeMismatch { .. } => Self::FerryPayloadShapeMismatch,
            Error::LengthMismatch { .. } => Self::FerryLengthMismatch,
            Error::TypeMismatch { .. } => Self::FerryTypeMismatch,
            Error::BufferTooSmall { .. } => Self::FerryBufferTooSmall,
            Error::InvalidData(_) => Self::FerryInvalidData,
            Error::UseAfterRelease(_) => Self::FerryUseAfterRelease,
            Error::OwnershipViolation { .. } => Self::FerryOwnershipViolation,
        }
    }
}

fn fail(e: &Error) -> FerryError {
    log::debug!("ffi call failed: {}", e);
    FerryError::from(e)
}

// =============================================================================
// Sides
// =============================================================================

/// Boundary side selector for context creation.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FerrySide {
    FerrySideNative = 0,
    FerrySideManaged = 1,
}

impl From<FerrySide> for Side {
    fn from(side: FerrySide) -> Self {
        match side {
            FerrySide::FerrySideNative => Self::Native,
            FerrySide::FerrySideManaged => Self::Managed,
        }
    }
}

// =============================================================================
// Opaque handles
// =============================================================================

/// Opaque handle to a ferry runtime (shared registries).
#[repr(C)]
pub struct FerryRuntime {
    _private: [u8; 0],
}

/// Opaque handle to a per-side boundary context.
#[repr(C)]
pub struct FerryContext {
    _private: [u8; 0],
}

struct RuntimeInner {
    types: Arc<TypeRegistry>,
    handles: Arc<HandleRegistry>,
}

/// A managed-side resource registered through the FFI: an opaque pointer
/// plus an optional destructor invoked exactly once, when the handle is
/// released and the last in-flight reference drops.
struct ForeignResource {
    data: *mut c_void,
    destroy: Option<unsafe extern "C" fn(*mut c_void)>,
}

// The caller contract (below) requires `data` to be valid for shared use
// from any thread until the destructor runs.
unsafe impl Send for ForeignResource {}
unsafe impl Sync for ForeignResource {}

impl Drop for ForeignResource {
    fn drop(&mut self) {
        if let Some(destroy) = self.destroy {
            unsafe { destroy(self.data) };
        }
    }
}

// =============================================================================
// Runtime and context lifecycle
// =============================================================================

/// Create a new ferry runtime: one type registry and one handle registry
/// shared by every context created from it.
#[no_mangle]
pub extern "C" fn ferry_runtime_new() -> *mut FerryRuntime {
    let inner = RuntimeInner {
        types: Arc::new(TypeRegistry::new()),
        handles: Arc::new(HandleRegistry::new()),
    };
    Box::into_raw(Box::new(inner)).cast::<FerryRuntime>()
}

/// Destroy a runtime created by [`ferry_runtime_new`].
///
/// # Safety
/// - `runtime` must come from `ferry_runtime_new` and not be used afterwards.
/// - All contexts created from it must be destroyed first.
#[no_mangle]
pub unsafe extern "C" fn ferry_runtime_destroy(runtime: *mut FerryRuntime) {
    if !runtime.is_null() {
        drop(Box::from_raw(runtime.cast::<RuntimeInner>()));
    }
}

/// Create a boundary context for one side of the FFI.
///
/// # Safety
/// - `runtime` must be a valid runtime pointer.
#[no_mangle]
pub unsafe extern "C" fn ferry_context_new(
    runtime: *const FerryRuntime,
    side: FerrySide,
) -> *mut FerryContext {
    if runtime.is_null() {
        return ptr::null_mut();
    }
    let inner = &*runtime.cast::<RuntimeInner>();
    let ctx = BoundaryContext::new(side.into(), inner.types.clone(), inner.handles.clone());
    Box::into_raw(Box::new(ctx)).cast::<FerryContext>()
}

/// Destroy a context created by [`ferry_context_new`]. Does not affect the
/// runtime or any live handles.
///
/// # Safety
/// - `context` must come from `ferry_context_new` and not be used afterwards.
#[no_mangle]
pub unsafe extern "C" fn ferry_context_destroy(context: *mut FerryContext) {
    if !context.is_null() {
        drop(Box::from_raw(context.cast::<BoundaryContext>()));
    }
}

// =============================================================================
// Type registration
// =============================================================================

/// Register an opaque handle type under `name`. Values of the type cross
/// the boundary as handles, never by content.
///
/// # Safety
/// - `context` must be valid. `name` must be a valid null-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn ferry_register_handle_type(
    context: *const FerryContext,
    name: *const c_char,
) -> FerryError {
    if context.is_null() || name.is_null() {
        return FerryError::FerryInvalidArgument;
    }
    let Ok(name_str) = CStr::from_ptr(name).to_str() else {
        return FerryError::FerryInvalidArgument;
    };
    let ctx = &*context.cast::<BoundaryContext>();
    match ctx.register_type(TypeDescriptor::handle(name_str)) {
        Ok(_) => FerryError::FerryOk,
        Err(e) => fail(&e),
    }
}

// =============================================================================
// Handle lifecycle
// =============================================================================

/// Register a resource and return its handle id in `out_handle`. The
/// context's side becomes the owner. `destroy`, if non-null, runs exactly
/// once when the handle is released and no resolver still holds the
/// resource.
///
/// # Safety
/// - `context` and `out_handle` must be valid pointers.
/// - `data` must stay valid for use from any thread until `destroy` runs.
#[no_mangle]
pub unsafe extern "C" fn ferry_handle_acquire(
    context: *const FerryContext,
    data: *mut c_void,
    destroy: Option<unsafe extern "C" fn(*mut c_void)>,
    out_handle: *mut u64,
) -> FerryError {
    if context.is_null() || out_handle.is_null() {
        return FerryError::FerryInvalidArgument;
    }
    let ctx = &*context.cast::<BoundaryContext>();
    let id = ctx.acquire(Arc::new(ForeignResource { data, destroy }));
    *out_handle = id.raw();
    FerryError::FerryOk
}

/// Resolve a live handle to the `data` pointer it was acquired with.
///
/// # Safety
/// - `context` and `out_data` must be valid pointers.
#[no_mangle]
pub unsafe extern "C" fn ferry_handle_resolve(
    context: *const FerryContext,
    handle: u64,
    out_data: *mut *mut c_void,
) -> FerryError {
    if context.is_null() || out_data.is_null() {
        return FerryError::FerryInvalidArgument;
    }
    let ctx = &*context.cast::<BoundaryContext>();
    match ctx.resolve(HandleId::from_raw(handle)) {
        Ok(resource) => match resource.downcast_ref::<ForeignResource>() {
            Some(foreign) => {
                *out_data = foreign.data;
                FerryError::FerryOk
            }
            // Registered from the Rust API with a non-FFI payload.
            None => FerryError::FerryTypeMismatch,
        },
        Err(e) => fail(&e),
    }
}

/// Release a handle owned by this context's side. The second release of the
/// same handle returns `FerryUseAfterRelease`; a release from the wrong
/// side returns `FerryOwnershipViolation`.
///
/// # Safety
/// - `context` must be valid.
#[no_mangle]
pub unsafe extern "C" fn ferry_handle_release(
    context: *const FerryContext,
    handle: u64,
) -> FerryError {
    if context.is_null() {
        return FerryError::FerryInvalidArgument;
    }
    let ctx = &*context.cast::<BoundaryContext>();
    match ctx.release(HandleId::from_raw(handle)) {
        Ok(()) => FerryError::FerryOk,
        Err(e) => fail(&e),
    }
}

/// Whether the handle is currently live.
///
/// # Safety
/// - `context` must be valid.
#[no_mangle]
pub unsafe extern "C" fn ferry_handle_is_live(
    context: *const FerryContext,
    handle: u64,
) -> bool {
    if context.is_null() {
        return false;
    }
    let ctx = &*context.cast::<BoundaryContext>();
    ctx.handles().is_live(HandleId::from_raw(handle))
}

// =============================================================================
// Handle collections
// =============================================================================

/// Marshal a collection of handles of the registered type `type_name` into
/// a wire buffer. The caller owns the returned buffer and must return it
/// via [`ferry_buffer_free`] (or hand it to the peer, who unmarshals and
/// frees it).
///
/// # Safety
/// - `context`, `type_name` and `out_wire` must be valid pointers.
/// - `handles` must point to `len` readable ids (may be null when `len` is 0).
#[no_mangle]
pub unsafe extern "C" fn ferry_marshal_handle_sequence(
    context: *const FerryContext,
    type_name: *const c_char,
    handles: *const u64,
    len: usize,
    out_wire: *mut FerryBuffer,
) -> FerryError {
    if context.is_null() || type_name.is_null() || out_wire.is_null() {
        return FerryError::FerryInvalidArgument;
    }
    if handles.is_null() && len > 0 {
        return FerryError::FerryInvalidArgument;
    }
    let Ok(name_str) = CStr::from_ptr(type_name).to_str() else {
        return FerryError::FerryInvalidArgument;
    };
    let ctx = &*context.cast::<BoundaryContext>();
    let Some(desc) = ctx.types().lookup(name_str) else {
        return FerryError::FerryUnregisteredType;
    };

    let ids: &[u64] = if len == 0 {
        &[]
    } else {
        std::slice::from_raw_parts(handles, len)
    };
    let items: Vec<Value> = ids
        .iter()
        .map(|&raw| Value::Handle(HandleId::from_raw(raw)))
        .collect();

    match ctx.marshal_sequence(&desc, &items) {
        Ok(bytes) => {
            *out_wire = FerryBuffer::from_vec(bytes);
            FerryError::FerryOk
        }
        Err(e) => fail(&e),
    }
}

/// Unmarshal a wire collection of handles of type `type_name`, transferring
/// ownership of every element to this context's side. On failure no
/// transfer sticks. `out_handles` receives up to `capacity` ids and
/// `out_len` the element count; a collection larger than `capacity` fails
/// with `FerryInvalidArgument` before any transfer.
///
/// # Safety
/// - All pointer arguments must be valid; `wire` must point to `wire_len`
///   readable bytes; `out_handles` must have room for `capacity` ids.
#[no_mangle]
pub unsafe extern "C" fn ferry_unmarshal_handle_sequence(
    context: *const FerryContext,
    type_name: *const c_char,
    wire: *const u8,
    wire_len: usize,
    out_handles: *mut u64,
    capacity: usize,
    out_len: *mut usize,
) -> FerryError {
    if context.is_null() || type_name.is_null() || wire.is_null() || out_len.is_null() {
        return FerryError::FerryInvalidArgument;
    }
    if out_handles.is_null() && capacity > 0 {
        return FerryError::FerryInvalidArgument;
    }
    let Ok(name_str) = CStr::from_ptr(type_name).to_str() else {
        return FerryError::FerryInvalidArgument;
    };
    let ctx = &*context.cast::<BoundaryContext>();
    let Some(desc) = ctx.types().lookup(name_str) else {
        return FerryError::FerryUnregisteredType;
    };

    let bytes = std::slice::from_raw_parts(wire, wire_len);
    // Check the declared length against the caller's capacity before any
    // element (and any ownership transfer) is touched.
    if bytes.len() >= 4 {
        let declared = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
        if declared > capacity {
            return FerryError::FerryInvalidArgument;
        }
    }

    match ctx.unmarshal_sequence(&desc, bytes) {
        Ok(items) => {
            for (i, item) in items.iter().enumerate() {
                match item.as_handle() {
                    Some(id) => *out_handles.add(i) = id.raw(),
                    None => return FerryError::FerryTypeMismatch,
                }
            }
            *out_len = items.len();
            FerryError::FerryOk
        }
        Err(e) => fail(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_mapping_is_stable() {
        let err = Error::UseAfterRelease(HandleId::from_raw(7));
        assert_eq!(FerryError::from(&err), FerryError::FerryUseAfterRelease);

        let err = Error::LengthMismatch {
            expected: 2,
            got: 1,
        };
        assert_eq!(FerryError::from(&err), FerryError::FerryLengthMismatch);
    }

    #[test]
    fn test_runtime_and_context_lifecycle() {
        unsafe {
            let runtime = ferry_runtime_new();
            assert!(!runtime.is_null());

            let native = ferry_context_new(runtime, FerrySide::FerrySideNative);
            let managed = ferry_context_new(runtime, FerrySide::FerrySideManaged);
            assert!(!native.is_null());
            assert!(!managed.is_null());

            ferry_context_destroy(native);
            ferry_context_destroy(managed);
            ferry_runtime_destroy(runtime);
        }
    }

    #[test]
    fn test_null_arguments_are_rejected() {
        unsafe {
            assert_eq!(
                ferry_handle_release(ptr::null(), 0),
                FerryError::FerryInvalidArgument
            );
            assert!(ferry_context_new(ptr::null(), FerrySide::FerrySideNative).is_null());
        }
    }
}
