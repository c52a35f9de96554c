//! Constantes del pipeline.

/// Moléculas por chunk si el llamador no indica otra cosa.
pub const DEFAULT_CHUNK_SIZE: usize = 100;

/// Workers por defecto (secuencial).
pub const DEFAULT_NJOBS: usize = 1;

/// Aviso de citación; se imprime una vez por `calculate` de nivel superior.
pub const BANNER: &str = "PaDEL-Descriptor is a software for calculating molecular
descriptors and fingerprints. The software calculates
1875 descriptors (1444 1D and 2D descriptors, and 431
3D descriptors) and 12 types of fingerprints.

###################################

Should you publish results based on the PaDEL descriptors,
please cite:

Yap, C.W. (2011), PaDEL-descriptor: An open source software
to calculate molecular descriptors and fingerprints.
J. Comput. Chem., 32: 1466-1474. https://doi.org/10.1002/jcc.21707

###################################
";

/// Molécula proxy 2D (metano sin coordenadas) para la fila vacía.
pub const PROXY_2D_MOLBLOCK: &str = "methane
     padel          2D

  1  0  0  0  0  0  0  0  0  0999 V2000
    0.0000    0.0000    0.0000 C   0  0  0  0  0  0  0  0  0  0  0  0
M  END
";

/// Molécula proxy 3D: etano escalonado con hidrógenos explícitos.
pub const PROXY_3D_MOLBLOCK: &str = "ethane
     padel          3D

  8  7  0  0  0  0  0  0  0  0999 V2000
   -0.7560    0.0000    0.0000 C   0  0  0  0  0  0  0  0  0  0  0  0
    0.7560    0.0000    0.0000 C   0  0  0  0  0  0  0  0  0  0  0  0
   -1.1404    1.0274    0.0000 H   0  0  0  0  0  0  0  0  0  0  0  0
   -1.1404   -0.5137    0.8898 H   0  0  0  0  0  0  0  0  0  0  0  0
   -1.1404   -0.5137   -0.8898 H   0  0  0  0  0  0  0  0  0  0  0  0
    1.1404   -1.0274    0.0000 H   0  0  0  0  0  0  0  0  0  0  0  0
    1.1404    0.5137    0.8898 H   0  0  0  0  0  0  0  0  0  0  0  0
    1.1404    0.5137   -0.8898 H   0  0  0  0  0  0  0  0  0  0  0  0
  1  2  1  0
  1  3  1  0
  1  4  1  0
  1  5  1  0
  2  6  1  0
  2  7  1  0
  2  8  1  0
M  END
";

/// Dónde consultar el detalle de cada descriptor.
pub const DETAILS_URL: &str = "http://www.yapcwsoft.com/dd/padeldescriptor/";
