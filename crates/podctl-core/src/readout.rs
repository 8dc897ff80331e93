#![forbid(unsafe_code)]

//! Observable control state for rendering.

/// Snapshot of both control values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ControlReadout {
    pub heading: i32,
    pub telegraph: i32,
}

impl ControlReadout {
    #[must_use]
    pub const fn new(heading: i32, telegraph: i32) -> Self {
        Self { heading, telegraph }
    }
}

/// Renders as `"12° -40%"`.
impl core::fmt::Display for ControlReadout {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}° {}%", self.heading, self.telegraph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_degree_and_percent() {
        assert_eq!(ControlReadout::new(12, -40).to_string(), "12° -40%");
        assert_eq!(ControlReadout::default().to_string(), "0° 0%");
    }
}
