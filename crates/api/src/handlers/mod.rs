pub mod tier_list;
pub mod tier_list_view;
