//! The host side-channel shapes write through.
//!
//! Shapes never mutate committed props. The only way a change reaches the
//! document is a `ShapeUpdate` handed to a `HostHandle`, passed explicitly
//! to the operation that needs it.

use ac_core::error::ShapeResult;
use ac_core::model::ShapeUpdate;

pub trait HostHandle {
    /// Commit every patch in `update` atomically, or none of them.
    fn update_shape(&mut self, update: ShapeUpdate) -> ShapeResult<()>;
}

impl<F> HostHandle for F
where
    F: FnMut(ShapeUpdate) -> ShapeResult<()>,
{
    fn update_shape(&mut self, update: ShapeUpdate) -> ShapeResult<()> {
        self(update)
    }
}
