//! Type labels for ORG and X- properties, which shipped without them.

use super::create_rel_types;
use crate::{
  plan::Plan,
  tables::{CONTACT_ORG, CONTACT_XTENDED},
};

pub(super) fn change(p: &mut Plan) {
  create_rel_types(p, CONTACT_ORG, "ORG_ID");
  create_rel_types(p, CONTACT_XTENDED, "XTENDED_ID");
}
