use crate::Status;

/// Error channel paired with [`Status`] on every tick. Any non-`Ok`
/// result aborts the tick that produced it.
pub type BtError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type BtResult = Result<Status, BtError>;

/// A tickable behavior tree node operating on a mutable world.
///
/// A tick must not block or suspend; long-running work returns
/// [`Status::Running`] and continues when ticked again.
pub trait Behavior<W> {
    fn tick(&mut self, world: &mut W) -> BtResult;

    /// Drop any cross-tick memory. Composites call this when they
    /// complete, so a later tick starts from a clean slate.
    fn reset(&mut self) {}
}

struct FnBehavior<F>(F);

impl<W, F> Behavior<W> for FnBehavior<F>
where
    F: FnMut(&mut W) -> BtResult,
{
    fn tick(&mut self, world: &mut W) -> BtResult {
        (self.0)(world)
    }
}

/// Build a leaf behavior from a tick function.
pub fn from_fn<W, F>(f: F) -> impl Behavior<W>
where
    F: FnMut(&mut W) -> BtResult,
{
    FnBehavior(f)
}
