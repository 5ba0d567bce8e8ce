pub mod task_ops;
pub mod vocab_ops;
