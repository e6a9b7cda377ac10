use idlc_core::{Field, Function, Program, Service, Type};

use crate::test_utils::{file, generate_ok, geometry, go_block, snippet};

fn finder_go() -> String {
    file(&generate_ok(&geometry()), "finder.go").to_owned()
}

/// Service without a base, taking an optional argument.
fn echo() -> Program {
    let mut say = Function::new("say", Type::string())
        .arg(Field::new(1, "msg", Type::string()).optional());
    say.doc = Some("Repeats the message.".to_owned());

    let mut p = Program::new("echo");
    p.services.push(Service::new("Echo").function(say));
    p
}

#[test]
fn interface_embeds_base() {
    let src = finder_go();

    insta::assert_snapshot!(snippet(&src, "type Finder interface"), @r"
    type Finder interface {
        shared.BaseService

        Find(ctx thrift.Context, name string) (res *Point, err error)
        Ping(ctx thrift.Context) (err error)
        Count(ctx thrift.Context, type_a1 Color) (res int32, err error)
    }
    ");
}

#[test]
fn client_holds_base_by_composition() {
    let src = finder_go();

    insta::assert_snapshot!(snippet(&src, "type FinderClient struct"), @r"
    type FinderClient struct {
        client thrift.TClient
        base *shared.BaseServiceClient
    }
    ");
    assert!(src.contains(
        "func NewFinderClient(cl thrift.TClient) *FinderClient {\n\treturn &FinderClient{client: cl, base: shared.NewBaseServiceClient(cl)}\n}"
    ));
    assert!(src.contains("cl, err := p.Build(\"geometry\", \"Finder\")"));

    insta::assert_snapshot!(snippet(&src, "func (p *FinderClient) GetItem("), @r"
    func (p *FinderClient) GetItem(ctx thrift.Context, key int32) (res *shared.SharedItem, err error) {
        return p.base.GetItem(ctx, key)
    }
    ");
}

#[test]
fn client_call_with_exceptions() {
    let src = finder_go();

    insta::assert_snapshot!(snippet(&src, "func (p *FinderClient) Find("), @r#"
    func (p *FinderClient) Find(ctx thrift.Context, name string) (res *Point, err error) {
        args := FinderFindArgs{
            Name: name,
        }
        result := FinderFindResult{}
        if err = p.client.CallBinary(ctx, "find", &args, &result); err != nil {
            return res, err
        }
        if result.NotFound != nil {
            return res, result.NotFound
        }
        if !result.IsSetSuccess() {
            return res, thrift.NewTApplicationException(thrift.MISSING_RESULT, "find failed: unknown result")
        }
        return result.GetSuccess(), nil
    }
    "#);
}

#[test]
fn oneway_client_call() {
    let src = finder_go();

    insta::assert_snapshot!(snippet(&src, "func (p *FinderClient) Ping("), @r#"
    func (p *FinderClient) Ping(ctx thrift.Context) (err error) {
        args := FinderPingArgs{}
        return p.client.CallUnary(ctx, "ping", &args)
    }
    "#);
}

#[test]
fn processor_chains_base() {
    let src = finder_go();

    insta::assert_snapshot!(snippet(&src, "func NewFinderProcessor("), @r"
    func NewFinderProcessor(handler Finder, middlewares []thrift.TMiddleware) thrift.TProcessor {
        p := shared.NewBaseServiceProcessor(handler, middlewares)
        return NewFinderProcessorFactory(handler, p)
    }
    ");

    let factory = go_block(&src, "func NewFinderProcessorFactory(");
    assert!(factory.contains(
        "thrift.NewTBinaryProcessorFunction(p, \"find\", func() thrift.TRequest { return &FinderFindArgs{} }, &finderProcessorFind{handler: handler}),"
    ));
    assert!(factory.contains(
        "thrift.NewTUnaryProcessorFunction(p, \"ping\", func() thrift.TRequest { return &FinderPingArgs{} }, &finderProcessorPing{handler: handler}),"
    ));
    // Inherited functions are registered by the base processor.
    assert!(!factory.contains("\"get_item\""));
}

#[test]
fn handler_maps_declared_exceptions() {
    let src = finder_go();

    insta::assert_snapshot!(snippet(&src, "func (p *finderProcessorFind) Handle("), @r"
    func (p *finderProcessorFind) Handle(ctx thrift.Context, req thrift.TRequest) (thrift.TResponse, error) {
        args := req.(*FinderFindArgs)
        retval, err2 := p.handler.Find(ctx, args.Name)
        result := &FinderFindResult{}
        if err2 != nil {
            switch v := thrift.Cause(err2).(type) {
            case *NotFound:
                result.NotFound = v
                return result, nil
            }
            return nil, err2
        }
        result.Success = retval
        return result, nil
    }
    ");
    // Scalar results are stored behind a pointer.
    assert!(go_block(&src, "func (p *finderProcessorCount) Handle(")
        .contains("result.Success = &retval"));
}

#[test]
fn oneway_handler_returns_error_only() {
    let src = finder_go();

    insta::assert_snapshot!(snippet(&src, "func (p *finderProcessorPing) Handle("), @r"
    func (p *finderProcessorPing) Handle(ctx thrift.Context, req thrift.TRequest) error {
        err2 := p.handler.Ping(ctx)
        return err2
    }
    ");
    assert!(!src.contains("FinderPingResult"));
}

#[test]
fn helper_structs_follow_handlers() {
    let src = finder_go();

    let marker = src.find("// HELPER FUNCTIONS AND STRUCTURES").unwrap();
    let args = src.find("type FinderFindArgs struct").unwrap();
    let result = src.find("type FinderFindResult struct").unwrap();
    assert!(marker < args && args < result);

    assert!(src.contains("Name string `thrift:\"name,1,required\" json:\"name\"`"));
    assert!(src.contains("Success *Point `thrift:\"success,0\" json:\"success,omitempty\"`"));
    assert!(src.contains("NotFound *NotFound `thrift:\"not_found,1\" json:\"not_found,omitempty\"`"));
    assert!(src.contains("Success *int32 `thrift:\"success,0\" json:\"success,omitempty\"`"));
    assert!(src.contains("oprot.WriteStructBegin(\"find_result\")"));

    insta::assert_snapshot!(snippet(&src, "func (p *FinderFindResult) GetError()"), @r"
    func (p *FinderFindResult) GetError() error {
        if p.NotFound != nil {
            return p.NotFound
        }
        return nil
    }
    ");
    assert!(src.contains(
        "func (p *FinderFindResult) GetResult() interface{} {\n\treturn p.GetSuccess()\n}"
    ));
}

#[test]
fn service_definition() {
    let src = finder_go();
    let def = go_block(&src, "var finderServiceDefinition");

    assert!(def.contains("Result: &finderFindResultStructDefinition,"));
    assert!(def.contains("Args: finderFindArgsStructDefinition,"));
    assert!(def.contains("IsOneway: true,\n\t\t\tArgs: finderPingArgsStructDefinition,"));
    assert!(def.contains("Name: \"count\","));
}

#[test]
fn standalone_service() {
    let package = generate_ok(&echo());
    let src = file(&package, "echo.go");

    assert!(src.contains("type EchoClient struct {\n\tclient thrift.TClient\n}"));
    assert!(src.contains("return &EchoClient{client: cl}"));
    assert!(src.contains("p := thrift.NewTStandardProcessor(middlewares)"));
    assert!(src.contains("// Repeats the message.\n\tSay(ctx thrift.Context, msg string) (res string, err error)"));

    // Optional arguments travel behind a pointer.
    assert!(go_block(src, "func (p *EchoClient) Say(").contains("Msg: &msg,"));
    assert!(go_block(src, "func (p *echoProcessorSay) Handle(")
        .contains("retval, err2 := p.handler.Say(ctx, args.GetMsg())"));
}

#[test]
fn test_suffixed_service_file() {
    let mut p = Program::new("suite");
    p.services.push(Service::new("Load_Test"));
    let package = generate_ok(&p);

    assert!(package.file("load_test_.go").is_some());
    assert!(package.file("load_test.go").is_none());
}
