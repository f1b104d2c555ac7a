//! SeaORM entity models
//!
//! Database entities for Inkpress

pub(crate) mod article;
pub(crate) mod article_tag;
pub(crate) mod category;
pub(crate) mod tag;

pub use article::{
    ActiveModel as ArticleActiveModel, Column as ArticleColumn, Entity as ArticleEntity,
    Model as ArticleRow,
};

pub use article_tag::{
    ActiveModel as ArticleTagActiveModel, Column as ArticleTagColumn, Entity as ArticleTagEntity,
    Model as ArticleTagRow,
};

pub use category::{
    ActiveModel as CategoryActiveModel, Column as CategoryColumn, Entity as CategoryEntity,
    Model as CategoryRow,
};

pub use tag::{
    ActiveModel as TagActiveModel, Column as TagColumn, Entity as TagEntity, Model as TagRow,
};
