mod support;

mod array_reroot;
mod array_undo;
