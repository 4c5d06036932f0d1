//! Mapping metadata of the blog entities as JSON
//!
//! Usage: rowmap describe [--table <TABLE>] [--column <COLUMN> | --property <NAME>]

use crate::models::Comment;
use clap::Args;
use rowmap_core::descriptor::{EntityDescriptor, FieldDescriptor, KeyDescriptor, RelationDescriptor};
use rowmap_core::registry::Registry;
use serde::Serialize;

#[derive(Debug, Args)]
pub struct DescribeArgs {
    /// Only this table
    #[arg(long)]
    pub table: Option<String>,

    /// Resolve a relation join column of `--table`
    #[arg(long, requires = "table", conflicts_with = "property")]
    pub column: Option<String>,

    /// Resolve the column mapped to a property of `--table`
    #[arg(long, requires = "table")]
    pub property: Option<String>,
}

#[derive(Debug, Serialize)]
struct TableReport<'a> {
    table: &'a str,
    entity: &'static str,
    keys: &'a [KeyDescriptor],
    fields: &'a [FieldDescriptor],
    relations: Vec<&'a RelationDescriptor>,
}

impl<'a> TableReport<'a> {
    fn new(descriptor: &'a EntityDescriptor) -> Self {
        Self {
            table: descriptor.table(),
            entity: descriptor.type_name(),
            keys: descriptor.keys(),
            fields: descriptor.fields(),
            relations: descriptor
                .relations_to_one()
                .iter()
                .chain(descriptor.relations_to_many())
                .collect(),
        }
    }
}

pub fn execute(args: DescribeArgs) -> Result<(), Box<dyn std::error::Error>> {
    // Comments reach every other blog table through their relations
    let registry = Registry::new();
    registry.ensure_registered::<Comment>()?;

    let Some(table) = args.table else {
        let descriptors = registry
            .tables()
            .iter()
            .map(|table| registry.descriptor(table))
            .collect::<rowmap_core::Result<Vec<_>>>()?;
        let reports: Vec<_> = descriptors.iter().map(|d| TableReport::new(d)).collect();
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    };

    let descriptor = registry.descriptor(&table)?;
    if let Some(column) = args.column {
        let relation = descriptor
            .relation_by_column(&column)
            .ok_or_else(|| format!("{} is not a relation column of {}", column, table))?;
        println!("{}", serde_json::to_string_pretty(relation)?);
    } else if let Some(property) = args.property {
        let column = descriptor
            .column_for_property(&property)
            .ok_or_else(|| format!("property {} is not mapped on {}", property, table))?;
        println!("{}", column);
    } else {
        println!("{}", serde_json::to_string_pretty(&TableReport::new(&descriptor))?);
    }
    Ok(())
}
