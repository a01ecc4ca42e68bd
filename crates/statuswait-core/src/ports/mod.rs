//! Ports - 抽象化レイヤー
//!
//! 外部とのやり取り（status API, ログ/出力ファイル, 時刻）を trait で切り出し、
//! Poller 本体からは実装の詳細を隠蔽します。

pub mod status_source;
pub mod event_sink;
pub mod clock;

pub use self::status_source::StatusSource;
pub use self::event_sink::EventSink;
pub use self::clock::{Clock, FixedClock, SystemClock};
