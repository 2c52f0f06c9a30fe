#![no_main]
use access_policy::{Context, DataContext, PolicyEngine, Restriction, Statement};
use libfuzzer_sys::{fuzz_target, arbitrary::{Arbitrary, Unstructured}};

#[derive(Debug, Arbitrary)]
struct Rule {
    action: String,
    resource: String,
    want: Option<(String, String)>,
}

#[derive(Debug, Arbitrary)]
struct Request {
    rules: Vec<Rule>,
    action: String,
    resource: String,
    attrs: Vec<(String, String)>,
}

fuzz_target!(|input: &[u8]| {
    let mut u = Unstructured::new(input);

    let req: Request = match u.arbitrary() {
        Ok(r) => r,
        Err(_) => return,
    };

    let statements: Vec<Statement> = req
        .rules
        .into_iter()
        .take(32)
        .map(|r| {
            let stmt = Statement::new(r.action, r.resource);
            match r.want {
                Some(pair) => stmt.with_restriction(Restriction::equals([pair])),
                None => stmt,
            }
        })
        .collect();

    let data: DataContext = req.attrs.into_iter().collect();
    let context = Context::new(req.action, req.resource);

    // Errors are fine, panics are not
    let _ = PolicyEngine::default().authorize(&statements, &context, &data);
});
