//! Plain-text rendering of a report.

use br_app::{PieChart, Report, ReportTimingSummary, headline_metrics};

pub fn print_report(report: &Report) {
    let metrics = &report.metrics;

    println!("\n{} ({})", report.system_name, report.system_id);
    println!("  Model: {}", report.model_path.display());
    println!(
        "  Main product: {} ({:.1} kg/hr, {:?})",
        metrics.product, metrics.product_mass_kg_per_hr, metrics.selection_basis
    );
    if report.simulation.tear_streams.is_empty() {
        println!("  Flowsheet has no recycle");
    } else {
        println!(
            "  Recycle converged in {} iterations (tears: {})",
            report.simulation.iterations,
            report.simulation.tear_streams.join(", ")
        );
    }

    println!("\nKey metrics:");
    for metric in headline_metrics(metrics) {
        println!("  {:<18} {}", metric.label, metric.value);
    }

    println!("\nCost breakdown:");
    match PieChart::from_breakdown(&metrics.cost_breakdown) {
        Ok(chart) => {
            println!("  {}", chart.title);
            for slice in &chart.slices {
                println!(
                    "  {:<10} {:>10.2}  {:>5.1}%",
                    slice.label,
                    slice.value,
                    slice.fraction * 100.0
                );
            }
        }
        Err(err) => println!("  ⚠ Could not build cost chart: {}", err),
    }
    println!(
        "  Total heating duty: {:.2} MM kJ/hr",
        metrics.heating_duty_mm_kj_per_hr
    );

    print_cashflow(report);

    println!("\nProduct composition ({}):", metrics.product);
    if metrics.composition.is_empty() {
        println!("  (empty stream)");
    }
    for row in &metrics.composition {
        println!("  {:<16} {:>14.3} kg/hr", row.chemical, row.mass_kg_per_hr);
    }
}

fn print_cashflow(report: &Report) {
    let table = &report.metrics.cashflow;
    println!("\nCash flow (IRR {:.1} %):", report.params.irr * 100.0);

    let headers: Vec<&str> = table
        .columns()
        .iter()
        .map(|c| c.trim_end_matches(" [MM$]"))
        .collect();
    let widths: Vec<usize> = headers.iter().map(|h| h.len().max(9)).collect();

    let mut line = format!("  {:>6}", "Year");
    for (header, width) in headers.iter().zip(&widths) {
        line.push_str(&format!("  {:>w$}", header, w = width));
    }
    println!("{}", line);

    for (year, row) in table.years().iter().zip(table.rows()) {
        let mut line = format!("  {:>6}", year);
        for (value, width) in row.iter().zip(&widths) {
            line.push_str(&format!("  {:>w$.3}", value, w = width));
        }
        println!("{}", line);
    }
    println!("  NPV at target IRR: {:.3} MM$", table.npv());
}

pub fn print_timing_summary(timing: &ReportTimingSummary) {
    let total = timing.total_time_s.max(1.0e-12);
    let pct = |t: f64| 100.0 * t / total;

    println!("\nTiming summary:");
    println!(
        "  Load:     {:.3}s ({:.1}%)",
        timing.load_time_s,
        pct(timing.load_time_s)
    );
    println!(
        "  Build:    {:.3}s ({:.1}%)",
        timing.build_time_s,
        pct(timing.build_time_s)
    );
    println!(
        "  Simulate: {:.3}s ({:.1}%)",
        timing.simulate_time_s,
        pct(timing.simulate_time_s)
    );
    println!(
        "  Metrics:  {:.3}s ({:.1}%)",
        timing.metrics_time_s,
        pct(timing.metrics_time_s)
    );
    println!("  Total:    {:.3}s", timing.total_time_s);
    println!("  Recycle iterations: {}", timing.recycle_iterations);
}
