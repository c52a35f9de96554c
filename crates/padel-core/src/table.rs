//! Tablas de resultados: columnas con nombre, filas de celdas numéricas.

use std::fmt;

use indexmap::IndexSet;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::PadelError;
use crate::hashing::{hash_str, hash_value};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Int(i64),
    Float(f64),
    Null,
}

impl Cell {
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Cell::Int(i) => Some(i as f64),
            Cell::Float(f) => Some(f),
            Cell::Null => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Int(i) => write!(f, "{i}"),
            Cell::Float(x) => write!(f, "{x}"),
            Cell::Null => Ok(()),
        }
    }
}

/// Regla única de parseo para ambas estrategias: vacío → `Null`, signo
/// opcional + dígitos → `Int` (si desborda, `Float`), resto → `Float`;
/// `NaN` e infinitos → `Null` (JSON no los representa).
pub fn parse_numeric(raw: &str) -> Result<Cell, PadelError> {
    let s = raw.trim();
    if s.is_empty() {
        return Ok(Cell::Null);
    }
    let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
    if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(i) = s.parse::<i64>() {
            return Ok(Cell::Int(i));
        }
    }
    match s.parse::<f64>() {
        Ok(f) if !f.is_finite() => Ok(Cell::Null),
        Ok(f) => Ok(Cell::Float(f)),
        Err(_) => Err(PadelError::EngineComputationFailure(format!("valor no numérico `{s}`"))),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultTable {
    columns: IndexSet<String>,
    rows: Vec<Vec<Cell>>,
}

// `IndexSet` compara como conjunto; aquí el orden de columnas cuenta.
impl PartialEq for ResultTable {
    fn eq(&self, other: &Self) -> bool {
        self.columns.iter().eq(other.columns.iter()) && self.rows == other.rows
    }
}

impl ResultTable {
    /// Tabla sin filas. Los nombres repetidos se quedan con la primera
    /// aparición.
    pub fn new<I, S>(columns: I) -> Self
        where I: IntoIterator<Item = S>,
              S: Into<String>
    {
        Self { columns: columns.into_iter().map(Into::into).collect(),
               rows: Vec::new() }
    }

    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Self, PadelError> {
        let mut table = Self::new(Vec::<String>::new());
        for name in columns {
            if !table.columns.insert(name.clone()) {
                return Err(PadelError::EngineComputationFailure(format!("columna repetida `{name}`")));
            }
        }
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    pub fn push_row(&mut self, row: Vec<Cell>) -> Result<(), PadelError> {
        if row.len() != self.columns.len() {
            return Err(PadelError::EngineComputationFailure(format!("fila con {} valores para {} columnas",
                                                                    row.len(),
                                                                    self.columns.len())));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().cloned().collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains(name)
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn get(&self, row: usize, column: &str) -> Option<Cell> {
        let col = self.columns.get_index_of(column)?;
        self.rows.get(row).and_then(|r| r.get(col)).copied()
    }

    pub fn column(&self, name: &str) -> Option<Vec<Cell>> {
        let col = self.columns.get_index_of(name)?;
        Some(self.rows.iter().map(|r| r[col]).collect())
    }

    pub fn is_null_row(&self, row: usize) -> bool {
        self.rows.get(row).map(|r| r.iter().all(Cell::is_null)).unwrap_or(false)
    }

    /// Concatenación por columnas. Todas las tablas deben tener `n_rows`
    /// filas; una columna ya presente se descarta.
    pub fn hconcat(tables: Vec<ResultTable>, n_rows: usize) -> Result<Self, PadelError> {
        let mut out = ResultTable { columns: IndexSet::new(),
                                    rows: vec![Vec::new(); n_rows] };
        for table in tables {
            if table.n_rows() != n_rows {
                return Err(PadelError::EngineComputationFailure(format!("{} filas, se esperaban {n_rows}",
                                                                        table.n_rows())));
            }
            let keep: Vec<usize> = table.columns
                                        .iter()
                                        .enumerate()
                                        .filter_map(|(i, name)| {
                                            if out.columns.insert(name.clone()) {
                                                Some(i)
                                            } else {
                                                debug!("table:hconcat duplicate column={name}");
                                                None
                                            }
                                        })
                                        .collect();
            for (dst, src) in out.rows.iter_mut().zip(table.rows) {
                dst.extend(keep.iter().map(|&i| src[i]));
            }
        }
        Ok(out)
    }

    /// Concatenación por filas de fragmentos con las mismas columnas.
    pub fn vconcat(columns: Vec<String>, fragments: Vec<ResultTable>) -> Result<Self, PadelError> {
        let mut out = ResultTable::new(columns);
        for fragment in fragments {
            if !fragment.columns.iter().eq(out.columns.iter()) {
                return Err(PadelError::EngineComputationFailure("fragmentos con columnas distintas".into()));
            }
            out.rows.extend(fragment.rows);
        }
        Ok(out)
    }

    /// Inserta filas nulas en las posiciones finales dadas (ascendentes).
    pub fn insert_null_rows(&mut self, positions: &[usize]) -> Result<(), PadelError> {
        let width = self.n_cols();
        for &pos in positions {
            if pos > self.rows.len() {
                return Err(PadelError::InvalidArgument(format!("posición {pos} fuera de rango ({})", self.rows.len())));
            }
            self.rows.insert(pos, vec![Cell::Null; width]);
        }
        Ok(())
    }

    /// Reordena y filtra a `requested`. Devuelve también las columnas pedidas
    /// que no estaban (se rellenan con nulos).
    pub fn reindex_columns(&self, requested: &[String]) -> (ResultTable, Vec<String>) {
        let mut columns = IndexSet::with_capacity(requested.len());
        let mut sources = Vec::with_capacity(requested.len());
        let mut missing = Vec::new();
        for name in requested {
            if !columns.insert(name.clone()) {
                continue;
            }
            let src = self.columns.get_index_of(name.as_str());
            if src.is_none() {
                missing.push(name.clone());
            }
            sources.push(src);
        }
        let rows = self.rows
                       .iter()
                       .map(|row| sources.iter().map(|src| src.map(|i| row[i]).unwrap_or(Cell::Null)).collect())
                       .collect();
        (ResultTable { columns, rows }, missing)
    }

    pub fn to_tsv(&self) -> String {
        let mut out = self.columns.iter().cloned().collect::<Vec<_>>().join("\t");
        out.push('\n');
        for row in &self.rows {
            let line: Vec<String> = row.iter().map(Cell::to_string).collect();
            out.push_str(&line.join("\t"));
            out.push('\n');
        }
        out
    }

    pub fn to_json(&self) -> Result<String, PadelError> {
        serde_json::to_string(self).map_err(|e| PadelError::InvalidArgument(e.to_string()))
    }

    /// Digest estable (blake3 del JSON canónico).
    pub fn digest(&self) -> String {
        match serde_json::to_value(self) {
            Ok(value) => hash_value(&value),
            Err(_) => hash_str(&self.to_tsv()),
        }
    }
}

/// Tabla de una selección para las moléculas Ready de un chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialResult {
    pub selection: String,
    pub table: ResultTable,
}
