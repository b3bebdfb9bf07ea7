use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Employee directory entry. The login alias doubles as the user name and
/// the numeric id as the local password.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "del_empleados")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub emp_id: i32,

    pub emp_alias: String,
}

impl ActiveModelBehavior for ActiveModel {}
