// Provider implementations for forum platforms
pub mod discourse;

pub use discourse::DiscourseProvider;
