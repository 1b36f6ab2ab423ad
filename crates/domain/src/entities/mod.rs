//! Domain entities - Contract rows and the meetings derived from them

mod calendar_invite;
mod contract_record;
mod meeting_event;

pub use calendar_invite::CalendarInvite;
pub use contract_record::{
    CONTRACT_COLUMNS, CONTRACT_DATE_FORMAT, ContractRecord, parse_contract_date,
    parse_duration_months,
};
pub use meeting_event::{MeetingEvent, MeetingKind};
