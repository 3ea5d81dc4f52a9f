pub mod member_number;
