//! Cross-crate integration flows.

pub mod fixtures;

#[cfg(test)]
mod confirmation_flow;
#[cfg(test)]
mod relay_flow;
#[cfg(test)]
mod snapshot_flow;
