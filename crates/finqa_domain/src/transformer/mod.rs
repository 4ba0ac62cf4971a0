mod swap_roles;

pub use swap_roles::SwapRoles;

/// A pure rewrite of a value, usually a message sequence, before it is handed
/// to a model.
pub trait Transformer {
    type Value;

    fn transform(&mut self, value: Self::Value) -> Self::Value;
}
