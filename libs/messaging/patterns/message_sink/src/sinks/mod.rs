mod channel;
mod fanout;
mod logging;

pub use channel::ChannelSink;
pub use fanout::FanoutSink;
pub use logging::LoggingSink;
