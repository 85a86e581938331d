// Copyright 2025 Irreducible Inc.

//! Conversion between `lt` trace files and array traces laid out by a schema.

use corset_field::Field;
use corset_trace::{
	lt::{RawColumn, RawModule, TraceFile},
	qualified_name, ArrayModule, ArrayTrace, Column,
};
use tracing::instrument;

use crate::builder::{Error, Schema};

/// Lays out the input columns of a trace file according to `schema`.
///
/// Computed registers start out empty and are filled by
/// [`expand_trace`](crate::expansion::expand_trace). Every input register must be supplied, and
/// all columns of a module must have the same number of rows, a multiple of the module's length
/// multiplier.
#[instrument("build_trace", skip_all, level = "debug")]
pub fn build_trace<F: Field>(schema: &Schema<F>, file: &TraceFile<F>) -> Result<ArrayTrace<F>, Error> {
	let modules = schema
		.modules()
		.iter()
		.map(|module| {
			let columns = module
				.registers()
				.iter()
				.map(|register| Column::empty(register.name(), register.padding()))
				.collect();
			ArrayModule::new(module.name(), 0, columns)
		})
		.collect();
	let mut trace = ArrayTrace::new(modules);
	let mut supplied = schema
		.modules()
		.iter()
		.map(|module| vec![false; module.width()])
		.collect::<Vec<_>>();

	for raw in &file.modules {
		let module_id = schema
			.has_module(&raw.name)
			.ok_or_else(|| Error::UnknownModule {
				name: raw.name.clone(),
			})?;
		let module = schema.module(module_id);
		let mut height = None;

		for raw_column in &raw.columns {
			let column = qualified_name(&raw.name, &raw_column.name);
			let register_id = module
				.has_register(&raw_column.name)
				.ok_or_else(|| Error::UnknownColumn {
					column: column.clone(),
				})?;
			let register = module.register(register_id);
			if register.is_computed() {
				return Err(Error::ComputedColumn { column });
			}

			let rows = raw_column.data.len();
			match height {
				Some(expected) if expected != rows => {
					return Err(Error::InconsistentHeight {
						column,
						expected,
						actual: rows,
					});
				}
				_ => height = Some(rows),
			}
			if rows % module.multiplier() != 0 {
				return Err(Error::InvalidHeight {
					column,
					height: rows,
					multiplier: module.multiplier(),
				});
			}

			let data = Column::new(register.name(), raw_column.data.clone(), register.padding());
			trace.fill_column(module_id, register_id, data);
			supplied[module_id][register_id] = true;
		}
	}

	for module in schema.modules() {
		for (id, register) in module.registers().iter().enumerate() {
			if register.is_input() && !supplied[module.id()][id] {
				return Err(Error::MissingColumn {
					column: qualified_name(module.name(), register.name()),
				});
			}
		}
	}
	Ok(trace)
}

/// Converts an expanded trace back into a trace file, in the heap layout.
///
/// Column bit-widths are the register widths, capped at the field's modulus size.
pub fn export_trace<F: Field>(schema: &Schema<F>, trace: &ArrayTrace<F>) -> TraceFile<F> {
	let modules = schema
		.modules()
		.iter()
		.zip(trace.modules())
		.map(|(module, array)| {
			let columns = module
				.registers()
				.iter()
				.zip(array.columns())
				.map(|(register, column)| {
					RawColumn::new(
						register.name(),
						register.width().min(F::MODULUS_BITS),
						column.data().clone(),
					)
				})
				.collect();
			RawModule {
				name: module.name().clone(),
				height: array.height(),
				columns,
			}
		})
		.collect();
	TraceFile::new(modules)
}
