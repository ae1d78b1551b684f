pub mod click_event;
pub mod period_statistic;
pub mod station;

pub use click_event::Entity as ClickEventEntity;
pub use period_statistic::Entity as PeriodStatisticEntity;
pub use station::Entity as StationEntity;
