//! vCard group syntax (`item1.TEL:...`) for every multi-valued property.

use super::optional;
use crate::{
  column::ColumnType,
  plan::Plan,
  table::TableOptions,
  tables::{PROP_GROUP, PROP_GROUP_TABLES},
};

pub(super) fn up(p: &mut Plan) {
  for table in PROP_GROUP_TABLES {
    p.table(table, TableOptions::default())
      .add_column(
        PROP_GROUP,
        ColumnType::String,
        optional().limit(45).comment("vCard property group"),
      )
      .update();
  }
}

pub(super) fn down(p: &mut Plan) {
  for table in PROP_GROUP_TABLES {
    p.table(table, TableOptions::default())
      .remove_column(PROP_GROUP)
      .update();
  }
}
