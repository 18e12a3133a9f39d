use sea_orm::entity::prelude::*;

/// Airports live in the `buildings` table.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "buildings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub guid: Uuid,
    pub title: Option<String>,
    pub country_id: Option<Uuid>,
    pub city_id: Option<Uuid>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub radius: Option<f64>,
    pub image: Option<String>,
    pub address: Option<String>,
    pub timezone_id: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub search_text: Option<String>,
    pub code: Option<String>,
    pub product_count: Option<i32>,
    pub gmt: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
