use boolexpr::utils::{prop_set, run_repeatedly_and_average};
use boolexpr::{Cnf, Dnf, FormError, ProvenSet};

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

fn main() -> Result<(), FormError> {
    #[cfg(feature = "dhat-heap")]
    let _profiler = dhat::Profiler::new_heap();

    env_logger::init();

    println!("\nExample 1: Building formulas");

    // (1 | 2) & 3
    let mut cnf = Cnf::or_props(1, 2);
    cnf.and_prop(3)?;
    println!("CNF: {}", cnf.to_string_sorted(true));
    let mut dnf = Dnf::or_props(1, 2);
    dnf.and_prop(3)?;
    println!("DNF: {}", dnf.to_string_sorted(true));

    println!("\nExample 2: Absorption");

    let formula = Cnf::from_string("<(2|5)&(4|7|7)&(5)>")?;
    println!("<(2|5)&(4|7|7)&(5)> ...simplifies to... {}", formula.to_string_sorted(true));

    println!("\nExample 3: Constants");

    for (name, form) in [("true", Cnf::get_true()), ("false", Cnf::get_false())] {
        println!("CNF {name}: {}", form.to_string_sorted(true));
    }
    for (name, form) in [("true", Dnf::get_true()), ("false", Dnf::get_false())] {
        println!("DNF {name}: {}", form.to_string_sorted(true));
    }
    let contradiction = Cnf::conjoin(&cnf, &Cnf::get_false());
    println!("Anything AND false is false?: {}", contradiction.is_false());

    println!("\nExample 4: CSV");

    let csv = formula.to_csv_string(true);
    println!("{csv}");
    println!("Round trip?: {}", Cnf::from_csv_string(&csv)? == formula);

    println!("\nExample 5: Mutually exclusive branches");

    // Paths through an if/else: 10 and 11 are the two branches, 20 is where they meet.
    let mut paths = Dnf::from_string("<(1&2&10)|(1&2&11)|(3&10)>")?;
    println!("Before: {}", paths.to_string_sorted(true));
    paths.simplify_with_mutex_nodes(&prop_set(&[10, 11]), &prop_set(&[20]))?;
    println!("After:  {}", paths.to_string_sorted(true));

    println!("\nExample 6: Forbidden phrases");

    let mut paths = Dnf::from_string("<(1&10&11)|(2&10)|(3&11&12)>")?;
    let siblings = prop_set(&[10, 11, 12]);
    println!("Before: {}", paths.to_string_sorted(true));
    paths.remove_forbidden_phrases(&siblings)?;
    println!("After:  {}", paths.to_string_sorted(true));
    println!(
        "Any forbidden phrases left?: {}",
        paths.contains_forbidden_siblings(&siblings)
    );

    println!("\nExample 7: A larger mutex simplification");

    // Every path prefix crossed with both branches of a diamond.
    let (left, right, join) = (10_000, 10_001, 10_002);
    let mut prefixes = Dnf::new();
    for i in 0..200 {
        prefixes.or(&Dnf::and_props(i, 1_000 + i))?;
    }
    let branches = Dnf::or_props(left, right);
    let diamond = Dnf::conjoin(&prefixes, &branches);
    println!("({} phrases before simplification)", diamond.len());
    let mutex_nodes: ProvenSet = [left, right].into_iter().collect();
    let join_points = ProvenSet::singleton(join);
    let mut simplified = diamond.clone();
    simplified.simplify_with_mutex_nodes(&mutex_nodes, &join_points)?;
    println!("({} phrases after simplification)", simplified.len());
    let mut outcome = Ok(());
    run_repeatedly_and_average(
        || {
            let mut form = diamond.clone();
            if let Err(e) = form.simplify_with_mutex_nodes(&mutex_nodes, &join_points) {
                outcome = Err(e);
            }
        },
        10,
    );
    outcome
}
