mod exam;
mod key;
mod result;
mod session;
mod state;
mod theme;

pub use exam::{ExamDocument, ExamError, Question};
pub use key::{ExamKey, KeyError, normalize_segment};
pub use result::{ExamResult, ResultIndex};
pub use session::{ExamMode, Session, SessionError};
pub use state::ExamState;
pub use theme::Theme;
