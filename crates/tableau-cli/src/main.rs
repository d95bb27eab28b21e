use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tableau_solver::{LpProblem, SimplexError, Solution, Solver, Tableau, Trajectory, Vertex};

#[derive(Parser)]
#[command(name = "tableau")]
#[command(about = "Solve small linear programs with the tableau simplex method", long_about = None)]
struct Cli {
    /// Log every tableau and pivot choice
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a problem file and output the optimal solution
    Solve {
        /// JSON file with `c`, `a`, `b` and optional `constant`
        file: PathBuf,
        /// Give up after this many pivots
        #[arg(long, default_value_t = 10000)]
        max_iterations: usize,
        /// Tolerance for floating point comparisons
        #[arg(long, default_value_t = 1e-9, value_parser = parse_tolerance)]
        tolerance: f64,
        /// Show shadow prices, reduced costs and binding constraints
        #[arg(short, long)]
        analysis: bool,
        /// Show every vertex visited on the way to the optimum
        #[arg(short, long)]
        trace: bool,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Pretty)]
        format: Format,
    },
    /// Check a problem file for errors
    Check {
        /// The file to check
        file: PathBuf,
    },
    /// Solve a built-in textbook problem
    Demo,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Pretty,
    Json,
}

/// On-disk problem: maximize c'x + constant subject to Ax <= b, x >= 0.
#[derive(Debug, Deserialize)]
struct ProblemFile {
    c: Vec<f64>,
    a: Vec<Vec<f64>>,
    b: Vec<f64>,
    #[serde(default)]
    constant: f64,
}

impl From<ProblemFile> for LpProblem {
    fn from(file: ProblemFile) -> Self {
        LpProblem::from_matrix(file.c, file.a, file.b, file.constant)
    }
}

#[derive(Serialize)]
struct Report<'a> {
    solution: &'a Solution,
    #[serde(skip_serializing_if = "Option::is_none")]
    trajectory: Option<&'a [Vertex]>,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Solve {
            file,
            max_iterations,
            tolerance,
            analysis,
            trace,
            format,
        } => {
            let problem = read_problem(&file);
            let solver = Solver::new()
                .with_max_iterations(max_iterations)
                .with_tolerance(tolerance);
            let mut trajectory = Trajectory::new(tolerance);

            let solution = match Tableau::build(&problem).and_then(|t| solver.optimize_with(t, &mut trajectory)) {
                Ok(s) => s,
                Err(e) => report_failure(&e),
            };

            match format {
                Format::Json => {
                    let report = Report {
                        solution: &solution,
                        trajectory: trace.then(|| trajectory.vertices()),
                    };
                    match serde_json::to_string_pretty(&report) {
                        Ok(json) => println!("{}", json),
                        Err(e) => {
                            eprintln!("Error writing JSON: {}", e);
                            std::process::exit(1);
                        }
                    }
                }
                Format::Pretty => {
                    print_solution(&problem, &solution, analysis, tolerance);
                    if trace {
                        println!();
                        print_trajectory(trajectory.vertices());
                    }
                }
            }
        }
        Commands::Check { file } => {
            let problem = read_problem(&file);
            match problem.validate() {
                Ok(()) => {
                    println!("✓ {} is valid", file.display());
                    println!("  {} variables", problem.num_variables());
                    println!("  {} constraints", problem.num_constraints());
                }
                Err(e) => {
                    eprintln!("✗ {} has errors:", file.display());
                    eprintln!("  {}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Demo => {
            let problem = demo_problem();
            let solver = Solver::new();
            let mut trajectory = Trajectory::new(solver.tolerance());

            let solution = match Tableau::build(&problem).and_then(|t| solver.optimize_with(t, &mut trajectory)) {
                Ok(s) => s,
                Err(e) => report_failure(&e),
            };

            println!("Final tableau:");
            println!("{}", solution.tableau);
            println!();
            print_solution(&problem, &solution, true, solver.tolerance());
            println!();
            print_trajectory(trajectory.vertices());
        }
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();
}

fn parse_problem(source: &str) -> Result<LpProblem, serde_json::Error> {
    let file: ProblemFile = serde_json::from_str(source)?;
    Ok(file.into())
}

fn read_problem(path: &Path) -> LpProblem {
    let source = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading file: {}", e);
            std::process::exit(1);
        }
    };

    match parse_problem(&source) {
        Ok(problem) => {
            log::debug!(
                "loaded {} ({} variables, {} constraints)",
                path.display(),
                problem.num_variables(),
                problem.num_constraints()
            );
            problem
        }
        Err(e) => {
            eprintln!("Parse error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Problem from the classic tableau lecture notes: optimum at (1.5, 1) with value 9.
fn demo_problem() -> LpProblem {
    LpProblem::from_matrix(
        vec![4.0, 3.0],
        vec![
            vec![2.0, 3.0],
            vec![-3.0, 2.0],
            vec![0.0, 2.0],
            vec![2.0, 1.0],
        ],
        vec![6.0, 3.0, 5.0, 4.0],
        0.0,
    )
}

fn report_failure(error: &SimplexError) -> ! {
    match error {
        SimplexError::Unbounded { .. } => {
            println!("Status: UNBOUNDED");
            println!("The problem has no finite optimal solution.");
        }
        SimplexError::NonConvergence { iterations } => {
            println!("Status: NOT CONVERGED");
            println!("No optimal tableau after {} pivots.", iterations);
        }
        SimplexError::InvalidInput(_) | SimplexError::ZeroPivot { .. } => {
            eprintln!("Solve error: {}", error);
        }
    }
    std::process::exit(1);
}

/// Human-readable solution, optionally with the sensitivity analysis.
struct SolutionReport<'a> {
    problem: &'a LpProblem,
    solution: &'a Solution,
    analysis: bool,
    tolerance: f64,
}

impl fmt::Display for SolutionReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (problem, solution) = (self.problem, self.solution);
        writeln!(f, "Status: OPTIMAL")?;
        writeln!(f, "Objective: {:.4}", solution.objective_value)?;
        writeln!(f, "Iterations: {}", solution.iterations)?;
        writeln!(f)?;
        writeln!(f, "Variables:")?;
        for (name, value) in problem.variables.iter().zip(&solution.values) {
            writeln!(f, "  {:20} {:10.4}", name, value)?;
        }

        if !self.analysis {
            return Ok(());
        }

        writeln!(f)?;
        writeln!(f, "Analysis:")?;
        writeln!(f)?;

        if !solution.analysis.binding_constraints.is_empty() {
            writeln!(f, "Binding constraints:")?;
            for &i in &solution.analysis.binding_constraints {
                writeln!(f, "  - {}", problem.constraints[i].name)?;
            }
            writeln!(f)?;
        }

        writeln!(f, "Shadow prices:")?;
        for sp in &solution.analysis.shadow_prices {
            if sp.value.abs() > self.tolerance {
                writeln!(f, "  {:20} {:10.4}", problem.constraints[sp.constraint].name, sp.value)?;
            }
        }
        writeln!(f)?;

        // For a maximization the row-0 entry of a non-basic column is the
        // increase its objective coefficient needs before it can enter.
        writeln!(f, "Reduced costs (variables not in solution):")?;
        for rc in &solution.analysis.reduced_costs {
            if !rc.is_basic && rc.reduced_cost.abs() > self.tolerance {
                writeln!(
                    f,
                    "  {:20} objective coefficient must rise by {:.4} to enter solution",
                    problem.variables[rc.variable], rc.reduced_cost
                )?;
            }
        }
        Ok(())
    }
}

fn print_solution(problem: &LpProblem, solution: &Solution, analysis: bool, tolerance: f64) {
    let report = SolutionReport {
        problem,
        solution,
        analysis,
        tolerance,
    };
    print!("{}", report);
}

/// Accepts finite, non-negative tolerances only.
fn parse_tolerance(s: &str) -> Result<f64, String> {
    let tolerance: f64 = s.parse().map_err(|e: std::num::ParseFloatError| e.to_string())?;
    if tolerance.is_finite() && tolerance >= 0.0 {
        Ok(tolerance)
    } else {
        Err(format!("tolerance must be finite and non-negative, got {}", s))
    }
}

fn print_trajectory(vertices: &[Vertex]) {
    println!("Trajectory:");
    for v in vertices {
        let point: Vec<String> = v.point.iter().map(|x| format!("{:.4}", x)).collect();
        let via = match v.pivot {
            Some(p) => format!("pivot ({}, {})", p.row, p.col),
            None => "start".to_string(),
        };
        println!(
            "  {:3} {:16} ({})  objective {:.4}",
            v.step,
            via,
            point.join(", "),
            v.objective
        );
    }
}
