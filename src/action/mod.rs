//! Action scripts: the static action table, compiled nodes, and the director that compiles
//! and plays them against a [`Renderer`](renderer::Renderer).

pub(crate) mod descriptor;
pub(crate) mod director;
pub(crate) mod node;
pub(crate) mod renderer;
pub(crate) mod table;
