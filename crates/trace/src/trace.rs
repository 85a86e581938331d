// Copyright 2025 Irreducible Inc.

use corset_field::Field;
use getset::{CopyGetters, Getters};

use crate::column::Column;

pub type ModuleIndex = usize;
pub type ColumnIndex = usize;

/// The columns of one module, all sharing a single height.
#[derive(Debug, Clone, PartialEq, Eq, Getters, CopyGetters)]
pub struct ArrayModule<F: Field> {
	#[get = "pub"]
	name: String,
	#[get_copy = "pub"]
	height: usize,
	#[get = "pub"]
	columns: Vec<Column<F>>,
}

impl<F: Field> ArrayModule<F> {
	pub fn new(name: impl ToString, height: usize, columns: Vec<Column<F>>) -> Self {
		Self {
			name: name.to_string(),
			height,
			columns,
		}
	}

	/// Number of columns.
	pub fn width(&self) -> usize {
		self.columns.len()
	}

	pub fn column(&self, index: ColumnIndex) -> &Column<F> {
		&self.columns[index]
	}

	pub fn column_mut(&mut self, index: ColumnIndex) -> &mut Column<F> {
		&mut self.columns[index]
	}

	pub fn find_column(&self, name: &str) -> Option<ColumnIndex> {
		self.columns.iter().position(|col| col.name() == name)
	}

	/// Updates the module height, e.g. after an assignment produced a column of a new length.
	pub fn resize(&mut self, height: usize) {
		if height != self.height {
			tracing::debug!(module = %self.name, from = self.height, to = height, "module resized");
			self.height = height;
		}
	}
}

/// A trace made of independently sized modules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArrayTrace<F: Field> {
	modules: Vec<ArrayModule<F>>,
}

impl<F: Field> ArrayTrace<F> {
	pub fn new(modules: Vec<ArrayModule<F>>) -> Self {
		Self { modules }
	}

	pub fn modules(&self) -> &[ArrayModule<F>] {
		&self.modules
	}

	pub fn module(&self, index: ModuleIndex) -> &ArrayModule<F> {
		&self.modules[index]
	}

	pub fn module_mut(&mut self, index: ModuleIndex) -> &mut ArrayModule<F> {
		&mut self.modules[index]
	}

	/// Fully qualified column name, `module.column`, or just `column` for the unnamed module.
	pub fn qualified_name(&self, module: ModuleIndex, column: ColumnIndex) -> String {
		qualified_name(self.modules[module].name(), self.modules[module].column(column).name())
	}

	/// Writes the values computed for one column.
	///
	/// The computed column must carry the same name as the column it replaces; anything else is a
	/// bug in whatever produced it. The module is resized when the new data changes its height.
	pub fn fill_column(&mut self, module: ModuleIndex, index: ColumnIndex, column: Column<F>) {
		let target = &mut self.modules[module];
		let existing = target.columns[index].name();
		assert_eq!(
			existing,
			column.name(),
			"computed column {} written to register {}",
			column.name(),
			existing
		);
		let height = column.len();
		target.columns[index] = column;
		target.resize(height);
	}
}

pub fn qualified_name(module: &str, column: &str) -> String {
	if module.is_empty() {
		column.to_string()
	} else {
		format!("{module}.{column}")
	}
}
