pub mod narration;
