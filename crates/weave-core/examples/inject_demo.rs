use weave_core::prelude::*;

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    println!("Weave injection demo");
    println!("--------------------");

    // 1. A two-category catalog
    let catalog = Catalog::new()
        .with_category(
            TaxonomyCategory::new("Primitives")
                .with_entry("int32", TypeDescriptor::new().with("c_type", "int32_t").with("title", "Int32"))?
                .with_entry("float64", TypeDescriptor::new().with("c_type", "double").with("title", "Float64"))?,
        )?
        .with_category(
            TaxonomyCategory::new("Composites")
                .with_entry("complex128", TypeDescriptor::new().with("c_type", "complex128_t").with("title", "Complex128"))?,
        )?;

    // 2. One Handlebars generator
    let mut builder = GeneratorRegistry::builder();
    builder.register_handlebars("tmpl_primitives", "cdef {{c_type}} as_{{title}}(object value)")?;

    let engine = InjectionEngine::new(WeaveConfig::default(), catalog, builder.build())?;

    // 3. A source file with one region
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("bindings.pyx");
    std::fs::write(
        &path,
        "# hand written\n# START INJECTION | tmpl_primitives(Primitives, Composites)\n# END INJECTION\n",
    )?;

    // 4. Preview, then write
    let mut stdout = std::io::stdout();
    engine.apply(&path, true, RunMode::Generate, &mut stdout)?;
    engine.apply(&path, false, RunMode::Generate, &mut stdout)?;
    engine.apply(&path, false, RunMode::Clean, &mut stdout)?;

    println!("\nAfter clean:\n{}", std::fs::read_to_string(&path)?);
    Ok(())
}
