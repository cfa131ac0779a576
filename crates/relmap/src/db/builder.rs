use super::Db;
use crate::Compiler;

use relmap_core::{driver::Driver, err, Result};

use std::sync::Arc;

#[derive(Debug, Default)]
pub struct Builder {
    compiler: Option<Arc<Compiler>>,
    driver: Option<Arc<dyn Driver>>,
}

impl Builder {
    pub fn compiler(&mut self, compiler: impl Into<Arc<Compiler>>) -> &mut Self {
        self.compiler = Some(compiler.into());
        self
    }

    pub fn driver(&mut self, driver: impl Driver) -> &mut Self {
        self.driver = Some(Arc::new(driver));
        self
    }

    pub fn build(&self) -> Result<Db> {
        let Some(compiler) = self.compiler.clone() else {
            return Err(err!("a Db requires a compiler"));
        };

        let Some(driver) = self.driver.clone() else {
            return Err(err!("a Db requires a driver"));
        };

        Ok(Db { compiler, driver })
    }
}
