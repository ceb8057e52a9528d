/// When the graph builder checks that every source slot is producible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Validation {
    /// `build` fails with `MissingSource` on a dangling source.
    #[default]
    Eager,
    /// Dangling sources surface as `NoRouteFor` once something requires them.
    Lazy,
}

/// Configuration entry-point for building a route graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphConfig {
    /// Source validation mode.
    pub validation: Validation,
}

impl GraphConfig {
    /// Config that defers source checks to resolution time.
    #[must_use]
    pub fn lazy() -> Self {
        Self {
            validation: Validation::Lazy,
        }
    }
}
