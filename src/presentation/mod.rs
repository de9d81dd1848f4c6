// Presentation layer - console rendering of session events

pub mod console;
