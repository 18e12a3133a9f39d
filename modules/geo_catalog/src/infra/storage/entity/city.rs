use sea_orm::entity::prelude::*;

/// `country_id` is a soft reference: no foreign key constraint is declared.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "cities")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub guid: Uuid,
    pub title: Option<String>,
    pub country_id: Option<Uuid>,
    pub city_code: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub offset: Option<String>,
    pub timezone_id: Option<String>,
    pub country_name: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
