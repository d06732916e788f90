pub mod article_detail;
pub mod article_list;
