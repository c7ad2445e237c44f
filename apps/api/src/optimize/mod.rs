// Rewrite proxy: rate-limited pass-through to the chat-completion service.

pub mod handlers;
