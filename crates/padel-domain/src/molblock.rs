//! Lectura mínima de bloques MOL V2000: lo justo para decidir si una
//! molécula puede ir al motor (átomos, coordenadas, hidrógenos) y para
//! reescribirla en el fichero SD del lote. La química real la hace el motor.

use serde::{Deserialize, Serialize};

use crate::DomainError;

/// Límite de la tabla de conexiones V2000 (campos de 3 caracteres).
pub const V2000_MAX_ATOMS: usize = 999;

const COORD_LIMIT: f64 = 99_999.0;
const SD_DELIMITER: &str = "$$$$";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    pub symbol: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MolBlock {
    header: Vec<String>,
    counts: String,
    atoms: Vec<Atom>,
    atom_lines: Vec<String>,
    bond_lines: Vec<String>,
    property_lines: Vec<String>,
}

impl MolBlock {
    pub fn parse(text: &str) -> Result<Self, DomainError> {
        let lines: Vec<&str> = text.lines().map(|l| l.trim_end_matches('\r')).collect();
        if lines.len() < 4 {
            return Err(DomainError::Parse("faltan cabecera o línea de cuentas".into()));
        }
        let counts = lines[3];
        if counts.contains("V3000") {
            return Err(DomainError::Parse("sólo se admite V2000".into()));
        }
        let (n_atoms, n_bonds) = parse_counts(counts)?;
        let body = &lines[4..];
        let n_entries = n_atoms.checked_add(n_bonds)
                               .ok_or_else(|| DomainError::Parse(format!("línea de cuentas desbordada: `{counts}`")))?;
        if body.len() < n_entries {
            return Err(DomainError::Parse(format!("se esperaban {n_atoms} átomos y {n_bonds} enlaces, hay {} líneas",
                                                  body.len())));
        }

        let atom_lines: Vec<String> = body[..n_atoms].iter().map(|l| l.to_string()).collect();
        let atoms = atom_lines.iter()
                              .enumerate()
                              .map(|(i, line)| parse_atom(line).ok_or_else(|| DomainError::Parse(format!("átomo {} ilegible: `{line}`", i + 1))))
                              .collect::<Result<Vec<_>, _>>()?;
        let bond_lines = body[n_atoms..n_entries].iter().map(|l| l.to_string()).collect();

        let mut property_lines = Vec::new();
        for line in &body[n_entries..] {
            if line.starts_with(SD_DELIMITER) {
                break;
            }
            property_lines.push(line.to_string());
            if line.starts_with("M  END") {
                break;
            }
        }
        if !property_lines.iter().any(|l| l.starts_with("M  END")) {
            property_lines.push("M  END".into());
        }

        Ok(MolBlock { header: lines[..3].iter().map(|l| l.to_string()).collect(),
                      counts: counts.to_string(),
                      atoms,
                      atom_lines,
                      bond_lines,
                      property_lines })
    }

    pub fn title(&self) -> &str {
        self.header.first().map(String::as_str).unwrap_or("")
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn bond_count(&self) -> usize {
        self.bond_lines.len()
    }

    /// Hay conformero si alguna coordenada es distinta de cero.
    pub fn has_conformer(&self) -> bool {
        self.atoms.iter().any(|a| a.x != 0.0 || a.y != 0.0 || a.z != 0.0)
    }

    /// Conformero 3D: la cabecera lo declara o hay alguna z no nula.
    pub fn is_3d(&self) -> bool {
        let declared = self.header
                           .get(1)
                           .and_then(|l| l.get(20..22))
                           .map(|dim| dim.eq_ignore_ascii_case("3D"))
                           .unwrap_or(false);
        self.has_conformer() && (declared || self.atoms.iter().any(|a| a.z != 0.0))
    }

    pub fn has_explicit_hydrogens(&self) -> bool {
        self.atoms.iter().any(|a| matches!(a.symbol.as_str(), "H" | "D" | "T"))
    }

    /// Reescribe el bloque V2000. Falla si algo no cabe en el formato de
    /// columnas fijas.
    pub fn to_v2000(&self) -> Result<String, DomainError> {
        if self.atom_count() > V2000_MAX_ATOMS || self.bond_count() > V2000_MAX_ATOMS {
            return Err(DomainError::Parse(format!("{} átomos / {} enlaces exceden el límite V2000",
                                                  self.atom_count(),
                                                  self.bond_count())));
        }
        if let Some(atom) = self.atoms.iter().find(|a| {
                                                  a.symbol.len() > 3
                                                  || [a.x, a.y, a.z].iter().any(|c| !c.is_finite() || c.abs() >= COORD_LIMIT)
                                              })
        {
            return Err(DomainError::Parse(format!("átomo `{}` no representable en V2000", atom.symbol)));
        }

        let mut out = String::new();
        for line in &self.header {
            out.push_str(line);
            out.push('\n');
        }
        // Las cuentas se regeneran; el resto de la línea se conserva.
        let tail = self.counts.get(6..).unwrap_or("  0  0  0  0  0  0  0  0999 V2000");
        out.push_str(&format!("{:>3}{:>3}{}\n", self.atom_count(), self.bond_count(), tail));
        for (atom, raw) in self.atoms.iter().zip(&self.atom_lines) {
            out.push_str(&format_atom_line(atom, raw));
            out.push('\n');
        }
        for line in self.bond_lines.iter().chain(&self.property_lines) {
            out.push_str(line);
            out.push('\n');
        }
        Ok(out)
    }
}

fn parse_counts(line: &str) -> Result<(usize, usize), DomainError> {
    // Un campo fijo válido está alineado a la derecha; si no, la línea viene
    // desbordada (más de 999 átomos) y se lee por espacios.
    let field = |range: std::ops::Range<usize>| -> Option<usize> {
        let raw = line.get(range)?;
        if !raw.ends_with(|c: char| c.is_ascii_digit()) {
            return None;
        }
        raw.trim().parse().ok()
    };
    let fixed = field(0..3).zip(field(3..6));
    if let Some(counts) = fixed {
        return Ok(counts);
    }
    let mut it = line.split_whitespace().map(str::parse::<usize>);
    match (it.next(), it.next()) {
        (Some(Ok(a)), Some(Ok(b))) => Ok((a, b)),
        _ => Err(DomainError::Parse(format!("línea de cuentas ilegible: `{line}`"))),
    }
}

fn parse_atom(line: &str) -> Option<Atom> {
    let fixed = || -> Option<Atom> {
        Some(Atom { x: line.get(0..10)?.trim().parse().ok()?,
                    y: line.get(10..20)?.trim().parse().ok()?,
                    z: line.get(20..30)?.trim().parse().ok()?,
                    symbol: line.get(31..34)?.trim().to_string() })
    };
    fixed().filter(|a| !a.symbol.is_empty()).or_else(|| {
                                                 let mut it = line.split_whitespace();
                                                 Some(Atom { x: it.next()?.parse().ok()?,
                                                             y: it.next()?.parse().ok()?,
                                                             z: it.next()?.parse().ok()?,
                                                             symbol: it.next()?.to_string() })
                                             })
}

/// Línea de átomo en columnas fijas; conserva los campos que siguen al
/// símbolo si la línea original los tenía.
fn format_atom_line(atom: &Atom, raw: &str) -> String {
    let rest = raw.get(34..).filter(|_| raw.get(31..34).map(str::trim) == Some(atom.symbol.as_str()));
    format!("{:>10.4}{:>10.4}{:>10.4} {:<3}{}",
            atom.x,
            atom.y,
            atom.z,
            atom.symbol,
            rest.unwrap_or(" 0  0  0  0  0  0  0  0  0  0  0  0"))
}

/// Parte un fichero SD en registros (sin el delimitador `$$$$`).
pub fn split_sd_records(sdf: &str) -> Vec<String> {
    let mut records = Vec::new();
    let mut current = String::new();
    for line in sdf.lines() {
        if line.trim_end().starts_with(SD_DELIMITER) {
            records.push(std::mem::take(&mut current));
            continue;
        }
        current.push_str(line);
        current.push('\n');
    }
    if !current.trim().is_empty() {
        records.push(current);
    }
    records
}
