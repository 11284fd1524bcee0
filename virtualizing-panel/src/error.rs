/// Errors surfaced by a layout pass or a scroll command.
///
/// `G` and `L` are the error types of the [`crate::ContainerGenerator`] and
/// [`crate::LayoutHost`] in use; their failures are passed through untouched.
#[derive(Debug, thiserror::Error)]
pub enum Error<G, L> {
    /// The container generator failed.
    #[error("container generator error: {0}")]
    Generator(G),

    /// Measuring or arranging a container failed.
    #[error("layout error: {0}")]
    Layout(L),

    /// An offset that is not a number was requested.
    #[error("invalid scroll offset: {0}")]
    InvalidOffset(f64),

    /// Regular keys were requested for irregular snap points, or the reverse.
    #[error("{} snap point keys requested from the other mode", requested_kind(.requested_regular))]
    SnapPointsMismatch { requested_regular: bool },
}

impl<G, L> Error<G, L> {
    pub fn is_generator(&self) -> bool {
        matches!(self, Self::Generator(_))
    }

    pub fn is_layout(&self) -> bool {
        matches!(self, Self::Layout(_))
    }
}

impl<G, L> From<InvalidOffset> for Error<G, L> {
    fn from(err: InvalidOffset) -> Self {
        Self::InvalidOffset(err.0)
    }
}

/// A scroll offset that is not a number.
#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
#[error("invalid scroll offset: {0}")]
pub struct InvalidOffset(pub f64);

impl<G, L> From<SnapPointsMismatch> for Error<G, L> {
    fn from(err: SnapPointsMismatch) -> Self {
        Self::SnapPointsMismatch {
            requested_regular: err.requested_regular,
        }
    }
}

/// Snap point keys were requested from the mode that is not configured.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{} snap point keys requested from the other mode", requested_kind(.requested_regular))]
pub struct SnapPointsMismatch {
    pub requested_regular: bool,
}

fn requested_kind(regular: &bool) -> &'static str {
    if *regular { "regular" } else { "irregular" }
}
