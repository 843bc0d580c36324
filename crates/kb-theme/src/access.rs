//! Reader entitlement state.

/// Whether the current reader may view gated content.
///
/// Entitlement is resolved by an upstream access layer (a header, a CLI
/// flag); this crate only consumes the resolved value. Until resolution
/// completes the state is [`Pending`](Self::Pending), which gates exactly
/// like a denial: content must never flash open while a check is in
/// flight.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AccessState {
    /// Entitlement has not been resolved yet. Treated as not entitled.
    #[default]
    Pending,
    /// Entitlement resolved by the upstream access layer.
    Resolved {
        /// True if the reader may view gated content.
        entitled: bool,
    },
}

impl AccessState {
    /// Shorthand for a resolved state.
    #[must_use]
    pub fn resolved(entitled: bool) -> Self {
        Self::Resolved { entitled }
    }

    /// Whether gated content may be rendered.
    #[must_use]
    pub fn is_entitled(self) -> bool {
        matches!(self, Self::Resolved { entitled: true })
    }
}
