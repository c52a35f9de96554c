use padel_domain::{DomainError, MolBlock, Registry, SelectionKind, SelectionOrigin, SelectionRequest, V2000_MAX_ATOMS};
use padel_engine::CapabilityShape;

#[test]
fn test_fixed_fingerprint_widths() {
    let reg = Registry::embedded().unwrap();
    let expected = [("EStateFP", 79),
                    ("MACCSFP", 166),
                    ("PubchemFP", 881),
                    ("SubFP", 307),
                    ("SubFPC", 307),
                    ("KRFP", 4860),
                    ("KRFPC", 4860),
                    ("AP2DFP", 780),
                    ("AP2DFPC", 780),
                    ("ExtFP", 1024),
                    ("FP", 1024),
                    ("GraphFP", 1024)];
    for (code, width) in expected {
        let sel = reg.lookup(code).unwrap();
        assert_eq!(sel.kind(), SelectionKind::Fingerprint);
        assert_eq!(sel.bit_width(), Some(width), "{code}");
        assert_eq!(sel.subcomponents().len(), width, "{code}");
        assert!(!sel.is_3d());
    }
    assert_eq!(reg.fingerprint_identifiers().len(), 12);
}

#[test]
fn test_long_and_short_names_resolve_to_same_selection() {
    let reg = Registry::embedded().unwrap();
    let long = reg.lookup("MACCS fingerprint").unwrap();
    let short = reg.lookup("MACCSFP").unwrap();
    assert_eq!(long, short);
    assert_eq!(short.identifier(), "MACCS fingerprint");
    assert_eq!(short.name(), "MACCSFP");
    assert_eq!(short.subcomponents()[0], "MACCSFP1");
    let ap = reg.lookup("AP2DFPC").unwrap();
    assert_eq!(ap.subcomponents()[0], "APC2D1");
}

#[test]
fn test_unknown_identifier_is_reported() {
    let reg = Registry::embedded().unwrap();
    match reg.resolve(&SelectionRequest::new("NotADescriptor")) {
        Err(DomainError::UnknownIdentifier(id)) => assert_eq!(id, "NotADescriptor"),
        other => panic!("se esperaba UnknownIdentifier, llegó {other:?}"),
    }
    // Los identificadores distinguen mayúsculas.
    assert!(!reg.contains("alogp"));
}

#[test]
fn test_descriptor_group_metadata() {
    let reg = Registry::embedded().unwrap();
    let alogp = reg.lookup("ALOGP").unwrap();
    assert_eq!(alogp.subcomponents(), &["ALogP", "ALogp2", "AMR"]);
    assert_eq!(alogp.shape(), CapabilityShape::Direct);
    assert_eq!(alogp.origin(), SelectionOrigin::Catalog);
    assert_eq!(alogp.bindings()[0].class, "libpadeldescriptor.CDK_ALOGPDescriptor");

    let atoms = reg.lookup("AtomCount").unwrap();
    assert_eq!(atoms.bindings().len(), 14);
    assert_eq!(atoms.subcomponents().len(), 14);

    let barysz = reg.lookup("BaryszMatrix").unwrap();
    assert_eq!(barysz.shape(), CapabilityShape::Composite);
    assert_eq!(barysz.subcomponents().len(), 91);

    let rdf = reg.lookup("RDF").unwrap();
    assert!(rdf.is_3d());
    assert_eq!(reg.describe("MW"), Some("Molecular weight"));
}

#[test]
fn test_autocorrelation_and_shape_groups() {
    let reg = Registry::embedded().unwrap();
    let whim = reg.lookup("WHIM").unwrap();
    assert!(whim.is_3d());
    assert_eq!(whim.subcomponents().len(), 91);
    assert_eq!(whim.subcomponents()[0], "L1u");
    assert_eq!(whim.bindings()[0].class, "libpadeldescriptor.CDK_WHIMDescriptor");

    for (id, is_3d) in [("Autocorrelation", false),
                        ("BurdenModifiedEigenvalues", false),
                        ("ExtendedTopochemicalAtom", false),
                        ("Autocorrelation3D", true),
                        ("CPSA", true)] {
        let sel = reg.lookup(id).unwrap();
        assert_eq!(sel.is_3d(), is_3d, "{id}");
        assert!(!sel.subcomponents().is_empty(), "{id}");
    }
    assert!(reg.lookup("CPSA").unwrap().subcomponents().iter().any(|c| c == "TPSA"));
    assert_eq!(reg.lookup("TPSA").unwrap().subcomponents(), &["TopoPSA"]);

    let estate = reg.lookup("ElectrotopologicalStateAtomType").unwrap();
    assert_eq!(estate.bindings().len(), 1);
    assert_eq!(estate.bindings()[0].class, "libpadeldescriptor.CDK_EStateAtomTypeDescriptor");
    assert!(estate.subcomponents().iter().any(|c| c == "SsCH3"));

    let two_d = reg.descriptor_columns(false);
    assert!(two_d.contains(&"ATS0m") && two_d.contains(&"ETA_Alpha"));
    assert!(!two_d.contains(&"TDB1u") && !two_d.contains(&"L1u"));
}

#[test]
fn test_descriptor_columns_exclude_3d_unless_asked() {
    let reg = Registry::embedded().unwrap();
    let two_d = reg.descriptor_columns(false);
    let all = reg.descriptor_columns(true);
    assert!(two_d.contains(&"nAcid"));
    assert!(!two_d.contains(&"geomShape"));
    assert!(all.contains(&"geomShape"));
    assert!(all.len() > two_d.len());
}

#[test]
fn test_configured_fingerprint_parameters() {
    let reg = Registry::embedded().unwrap();
    let graph = reg.resolve(&SelectionRequest::new("CDK graph only fingerprint").with_size(512)).unwrap();
    assert_eq!(graph.origin(), SelectionOrigin::Configured);
    assert_eq!(graph.bit_width(), Some(512));
    assert_eq!(graph.subcomponents().last().map(String::as_str), Some("GraphFP512"));
    assert_eq!(graph.params().map(|p| p.search_depth), Some(7));

    // En fingerprints de tamaño fijo los parámetros se ignoran.
    let fixed = reg.resolve(&SelectionRequest::new("MACCSFP").with_size(10)).unwrap();
    assert_eq!(fixed.origin(), SelectionOrigin::Catalog);
    assert_eq!(fixed.subcomponents().len(), 166);
    assert_eq!(&fixed, reg.lookup("MACCSFP").unwrap());
    let descriptor = reg.resolve(&SelectionRequest::new("ALOGP").with_size(10));
    assert!(matches!(descriptor, Err(DomainError::InvalidSelection(_))));
    let zero = reg.resolve(&SelectionRequest::new("FP").with_search_depth(0));
    assert!(matches!(zero, Err(DomainError::InvalidSelection(_))));
}

#[test]
fn test_global_registry_is_shared() {
    let a = Registry::global().unwrap();
    let b = Registry::global().unwrap();
    assert!(std::ptr::eq(a, b));
}

#[test]
fn test_large_molecule_cannot_be_written() {
    let mut block = String::from("big\n\n\n");
    let n = V2000_MAX_ATOMS + 1;
    block.push_str(&format!("{:>3}  0  0  0  0  0  0  0  0  0999 V2000\n", n));
    for i in 0..n {
        block.push_str(&format!("{:>10.4}{:>10.4}{:>10.4} C   0  0  0  0  0  0  0  0  0  0  0  0\n", i as f64, 0.0, 0.0));
    }
    block.push_str("M  END\n");
    let mol = MolBlock::parse(&block).unwrap();
    assert_eq!(mol.atom_count(), n);
    assert!(mol.to_v2000().is_err());
}
