use crate::db::Db;
use crate::links::LinkStore;

#[derive(Clone)]
pub struct AppContext {
  db: Db,
  links: LinkStore,
}

impl AppContext {
  pub fn new(db: Db, links: LinkStore) -> Self {
    Self { db, links }
  }

  pub fn db(&self) -> &Db {
    &self.db
  }

  pub fn links(&self) -> &LinkStore {
    &self.links
  }
}
