pub mod account_mapper;
pub mod member_mapper;

pub use account_mapper::AccountMapper;
pub use member_mapper::MemberMapper;
