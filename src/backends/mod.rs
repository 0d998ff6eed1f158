pub mod ytdlp;

pub use ytdlp::YtDlpBackend;
