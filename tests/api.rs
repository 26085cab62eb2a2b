// tests/api.rs
//
// Testes de ponta a ponta contra um Postgres real. Rodam apenas quando
// DATABASE_URL está definida; sem ela cada teste avisa e retorna cedo.
// Cada cenário cria seus próprios usuários e workspaces, então a suíte
// pode rodar em paralelo no mesmo banco.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;
use uuid::Uuid;

use canteiro_backend::{
    config::{AppState, StorageConfig},
    server::create_app,
};

const BOUNDARY: &str = "fronteira-de-teste";

async fn test_app() -> Option<Router> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL não definida; pulando teste de API");
        return None;
    };

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("falha ao conectar no banco de testes");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("falha ao rodar as migrações");

    // O storage nunca é chamado: nenhum teste envia parte de arquivo
    let state = AppState::from_pool(
        pool,
        "segredo-de-testes-de-api".to_string(),
        StorageConfig {
            endpoint: "http://localhost:1/v1".to_string(),
            project_id: "proj".to_string(),
            api_key: "chave".to_string(),
            bucket_id: "imagens".to_string(),
        },
    );

    Some(create_app(state))
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    let request = match body {
        Some(json_body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json_body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, value)
}

// Formulários multipart só com campos de texto, suficiente para as
// rotas que recebem form em vez de JSON
async fn send_form(
    app: &Router,
    method: &str,
    uri: &str,
    token: &str,
    fields: &[(&str, &str)],
) -> (StatusCode, Value) {
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));

    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    (status, value)
}

// Registra um usuário novo com email único e devolve o token
async fn register_user(app: &Router, name: &str) -> String {
    let email = format!("{}@teste.dev", Uuid::new_v4());

    let (status, body) = send(
        app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "name": name, "email": email, "password": "senha-segura" })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "registro falhou: {body}");
    body["data"]["token"].as_str().unwrap().to_string()
}

async fn create_workspace(app: &Router, token: &str, name: &str) -> Value {
    let (status, body) =
        send_form(app, "POST", "/api/workspaces", token, &[("name", name)]).await;

    assert_eq!(status, StatusCode::CREATED, "criação de workspace falhou: {body}");
    body["data"].clone()
}

#[tokio::test]
async fn registro_login_e_sessao() {
    let Some(app) = test_app().await else { return };

    let email = format!("{}@teste.dev", Uuid::new_v4());

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "name": "Mari", "email": email, "password": "senha-segura" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let token = body["data"]["token"].as_str().unwrap().to_string();

    // O token serve para /me
    let (status, body) = send(&app, "GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"].as_str().unwrap(), email);
    assert!(
        body["data"].get("passwordHash").is_none(),
        "o hash de senha nunca pode ser serializado"
    );

    // Login com a senha certa
    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": email, "password": "senha-segura" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["token"].is_string());

    // Senha errada
    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": email, "password": "senha-errada" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Email repetido
    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "name": "Mari", "email": email, "password": "outra-senha" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Logout responde mesmo sem nada a invalidar
    let (status, body) = send(&app, "POST", "/api/auth/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["success"], json!(true));
}

#[tokio::test]
async fn senha_curta_e_rejeitada_com_detalhes() {
    let Some(app) = test_app().await else { return };

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "name": "Ana", "email": "ana@teste.dev", "password": "curta" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"]["password"].is_array());
}

#[tokio::test]
async fn workspace_convite_e_entrada() {
    let Some(app) = test_app().await else { return };

    let admin_token = register_user(&app, "Dona da Obra").await;
    let workspace = create_workspace(&app, &admin_token, "Obra Central").await;
    let workspace_id = workspace["id"].as_str().unwrap();
    let invite_code = workspace["inviteCode"].as_str().unwrap();
    assert_eq!(invite_code.len(), 10);

    // A criadora já entra como membro e vê o workspace na listagem
    let (status, body) = send(&app, "GET", "/api/workspaces", Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], json!(1));

    let guest_token = register_user(&app, "Convidado").await;

    // Código errado
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/workspaces/{workspace_id}/join"),
        Some(&guest_token),
        Some(json!({ "code": "codigoerrado" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Código certo
    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/workspaces/{workspace_id}/join"),
        Some(&guest_token),
        Some(json!({ "code": invite_code })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "entrada falhou: {body}");

    // Entrar de novo: já é membro
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/workspaces/{workspace_id}/join"),
        Some(&guest_token),
        Some(json!({ "code": invite_code })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Membro comum não pode trocar o código
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/workspaces/{workspace_id}/reset-invite-code"),
        Some(&guest_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // A admin pode, e o código muda
    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/workspaces/{workspace_id}/reset-invite-code"),
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_ne!(body["data"]["inviteCode"].as_str().unwrap(), invite_code);
}

#[tokio::test]
async fn rotas_exigem_vinculo_com_o_workspace() {
    let Some(app) = test_app().await else { return };

    let member_token = register_user(&app, "Membro").await;
    let outsider_token = register_user(&app, "De Fora").await;

    let workspace = create_workspace(&app, &member_token, "Obra Restrita").await;
    let workspace_id = workspace["id"].as_str().unwrap();

    // Sem vínculo: 401 em leitura de workspace e de recursos
    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/workspaces/{workspace_id}"),
        Some(&outsider_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/epis?workspaceId={workspace_id}"),
        Some(&outsider_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Escrita sem vínculo também é 401 e não cria nada
    let (status, _) = send(
        &app,
        "POST",
        "/api/estoques",
        Some(&outsider_token),
        Some(json!({
            "name": "Invasão",
            "type": "Central",
            "location": "Canteiro",
            "workspaceId": workspace_id,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/estoques?workspaceId={workspace_id}"),
        Some(&member_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], json!(0));

    // Sem token nenhum: 401
    let (status, _) = send(&app, "GET", "/api/workspaces", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn mensagens_de_erro_seguem_o_accept_language() {
    let Some(app) = test_app().await else { return };

    let outsider_token = register_user(&app, "Gringo").await;
    let other_token = register_user(&app, "Dono").await;
    let workspace = create_workspace(&app, &other_token, "Obra Fechada").await;
    let workspace_id = workspace["id"].as_str().unwrap();

    let uri = format!("/api/workspaces/{workspace_id}");

    // Padrão: português
    let (status, body) = send(&app, "GET", &uri, Some(&outsider_token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"].as_str().unwrap(), "Não autorizado");

    // Com Accept-Language: en
    let request = Request::builder()
        .method("GET")
        .uri(&uri)
        .header(header::AUTHORIZATION, format!("Bearer {outsider_token}"))
        .header(header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"].as_str().unwrap(), "Unauthorized");
}

#[tokio::test]
async fn membros_listagem_papeis_e_ultimo_membro() {
    let Some(app) = test_app().await else { return };

    let admin_token = register_user(&app, "Admin").await;
    let workspace = create_workspace(&app, &admin_token, "Obra Equipe").await;
    let workspace_id = workspace["id"].as_str().unwrap();
    let invite_code = workspace["inviteCode"].as_str().unwrap();

    // Único membro: não dá para remover nem rebaixar
    let (_, body) = send(
        &app,
        "GET",
        &format!("/api/members?workspaceId={workspace_id}"),
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(body["data"]["total"], json!(1));
    let admin_member_id = body["data"]["documents"][0]["id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["documents"][0]["role"], json!("ADMIN"));
    assert!(body["data"]["documents"][0]["email"].is_string());

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/members/{admin_member_id}"),
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/api/members/{admin_member_id}"),
        Some(&admin_token),
        Some(json!({ "role": "MEMBER" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Entra um segundo usuário
    let member_token = register_user(&app, "Peão").await;
    send(
        &app,
        "POST",
        &format!("/api/workspaces/{workspace_id}/join"),
        Some(&member_token),
        Some(json!({ "code": invite_code })),
    )
    .await;

    let (_, body) = send(
        &app,
        "GET",
        &format!("/api/members?workspaceId={workspace_id}"),
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(body["data"]["total"], json!(2));
    let new_member = body["data"]["documents"]
        .as_array()
        .unwrap()
        .iter()
        .find(|m| m["id"].as_str() != Some(admin_member_id.as_str()))
        .unwrap()
        .clone();
    let new_member_id = new_member["id"].as_str().unwrap();
    assert_eq!(new_member["role"], json!("MEMBER"));

    // Membro comum não promove ninguém
    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/api/members/{new_member_id}"),
        Some(&member_token),
        Some(json!({ "role": "ADMIN" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Admin promove
    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/api/members/{new_member_id}"),
        Some(&admin_token),
        Some(json!({ "role": "ADMIN" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], json!("ADMIN"));

    // Agora com dois membros o primeiro pode sair
    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/members/{admin_member_id}"),
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn projetos_e_tarefas_no_quadro() {
    let Some(app) = test_app().await else { return };

    let token = register_user(&app, "Engenheira").await;
    let workspace = create_workspace(&app, &token, "Obra Kanban").await;
    let workspace_id = workspace["id"].as_str().unwrap();

    let (status, body) = send_form(
        &app,
        "POST",
        "/api/projects",
        &token,
        &[("name", "Terraplanagem"), ("workspaceId", workspace_id)],
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let project_id = body["data"]["id"].as_str().unwrap().to_string();

    let (_, body) = send(
        &app,
        "GET",
        &format!("/api/members?workspaceId={workspace_id}"),
        Some(&token),
        None,
    )
    .await;
    let member_id = body["data"]["documents"][0]["id"].as_str().unwrap().to_string();

    // Primeira tarefa da coluna entra na posição 1000
    let (status, body) = send(
        &app,
        "POST",
        "/api/tasks",
        Some(&token),
        Some(json!({
            "name": "Licenças ambientais",
            "status": "A_FAZER",
            "workspaceId": workspace_id,
            "projectId": project_id,
            "assigneeId": member_id,
            "dueDate": "2025-09-30T12:00:00Z",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "criação de tarefa falhou: {body}");
    let first_task_id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["position"], json!(1000));

    // Segunda tarefa na mesma coluna: 2000
    let (_, body) = send(
        &app,
        "POST",
        "/api/tasks",
        Some(&token),
        Some(json!({
            "name": "Topografia",
            "status": "A_FAZER",
            "workspaceId": workspace_id,
            "projectId": project_id,
            "assigneeId": member_id,
            "dueDate": "2025-10-15T12:00:00Z",
        })),
    )
    .await;
    let second_task_id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["position"], json!(2000));

    // Filtro por status devolve as duas, por busca devolve uma
    let (_, body) = send(
        &app,
        "GET",
        &format!("/api/tasks?workspaceId={workspace_id}&status=A_FAZER"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body["data"]["total"], json!(2));

    let (_, body) = send(
        &app,
        "GET",
        &format!("/api/tasks?workspaceId={workspace_id}&search=topo"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body["data"]["total"], json!(1));

    // Arrasto no quadro: troca as posições e move uma de coluna
    let (status, body) = send(
        &app,
        "POST",
        "/api/tasks/bulk-update",
        Some(&token),
        Some(json!({
            "tasks": [
                { "id": first_task_id, "status": "EM_PROGRESSO", "position": 1000 },
                { "id": second_task_id, "status": "A_FAZER", "position": 1000 },
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "bulk-update falhou: {body}");

    let (_, body) = send(
        &app,
        "GET",
        &format!("/api/tasks/{first_task_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body["data"]["status"], json!("EM_PROGRESSO"));

    // PATCH parcial: só o nome muda
    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/api/tasks/{second_task_id}"),
        Some(&token),
        Some(json!({ "name": "Topografia revisada" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], json!("Topografia revisada"));
    assert_eq!(body["data"]["status"], json!("A_FAZER"));

    // Exclusão
    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/api/tasks/{second_task_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"].as_str().unwrap(), second_task_id);

    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/tasks/{second_task_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn bulk_update_recusa_tarefas_de_workspaces_diferentes() {
    let Some(app) = test_app().await else { return };

    let token = register_user(&app, "Com Duas Obras").await;

    let mut task_ids = Vec::new();
    for name in ["Obra Um", "Obra Dois"] {
        let workspace = create_workspace(&app, &token, name).await;
        let workspace_id = workspace["id"].as_str().unwrap();

        let (_, body) = send_form(
            &app,
            "POST",
            "/api/projects",
            &token,
            &[("name", "Projeto"), ("workspaceId", workspace_id)],
        )
        .await;
        let project_id = body["data"]["id"].as_str().unwrap().to_string();

        let (_, body) = send(
            &app,
            "GET",
            &format!("/api/members?workspaceId={workspace_id}"),
            Some(&token),
            None,
        )
        .await;
        let member_id = body["data"]["documents"][0]["id"].as_str().unwrap().to_string();

        let (_, body) = send(
            &app,
            "POST",
            "/api/tasks",
            Some(&token),
            Some(json!({
                "name": "Tarefa",
                "status": "BACKLOG",
                "workspaceId": workspace_id,
                "projectId": project_id,
                "assigneeId": member_id,
                "dueDate": "2025-11-01T12:00:00Z",
            })),
        )
        .await;
        task_ids.push(body["data"]["id"].as_str().unwrap().to_string());
    }

    let (status, _) = send(
        &app,
        "POST",
        "/api/tasks/bulk-update",
        Some(&token),
        Some(json!({
            "tasks": [
                { "id": task_ids[0], "status": "BACKLOG", "position": 1000 },
                { "id": task_ids[1], "status": "BACKLOG", "position": 2000 },
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Nada mudou: as posições originais continuam
    let (_, body) = send(
        &app,
        "GET",
        &format!("/api/tasks/{}", task_ids[0]),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body["data"]["position"], json!(1000));
}

#[tokio::test]
async fn epis_normalizacao_de_formulario() {
    let Some(app) = test_app().await else { return };

    let token = register_user(&app, "Técnica de Segurança").await;
    let workspace = create_workspace(&app, &token, "Obra EPIs").await;
    let workspace_id = workspace["id"].as_str().unwrap();

    // Valores chegam como string, como um <form> manda
    let (status, body) = send_form(
        &app,
        "POST",
        "/api/epis",
        &token,
        &[
            ("name", "  Óculos de proteção  "),
            ("workspaceId", workspace_id),
            ("category", "Proteção dos olhos"),
            ("protectionType", "Impacto"),
            ("lifespan", "12"),
            ("lifespanUnit", "meses"),
            ("unitOfMeasure", "unidade"),
            ("application", "Esmerilhamento"),
            ("hasUvProtection", "true"),
            ("image", ""),
        ],
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "cadastro de EPI falhou: {body}");
    let epi_id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["name"], json!("Óculos de proteção"));
    assert_eq!(body["data"]["lifespan"], json!(12));
    assert_eq!(body["data"]["hasUvProtection"], json!(true));
    assert_eq!(body["data"]["imageUrl"], Value::Null);

    // Vida útil vazia fica ausente; "false" textual vira false
    let (status, body) = send_form(
        &app,
        "POST",
        "/api/epis",
        &token,
        &[
            ("name", "Luva nitrílica"),
            ("workspaceId", workspace_id),
            ("category", "Proteção das mãos"),
            ("protectionType", "Química"),
            ("lifespan", ""),
            ("unitOfMeasure", "par"),
            ("application", "Manuseio de solventes"),
            ("hasUvProtection", "false"),
        ],
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["lifespan"], Value::Null);
    assert_eq!(body["data"]["hasUvProtection"], json!(false));

    // Vida útil negativa: 400 com detalhes por campo
    let (status, body) = send_form(
        &app,
        "POST",
        "/api/epis",
        &token,
        &[
            ("name", "Protetor auricular"),
            ("workspaceId", workspace_id),
            ("category", "Proteção auditiva"),
            ("protectionType", "Ruído"),
            ("lifespan", "-3"),
            ("unitOfMeasure", "unidade"),
            ("application", "Britadeira"),
        ],
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"]["lifespan"].is_array());

    // PATCH parcial preserva o resto
    let (status, body) = send_form(
        &app,
        "PATCH",
        &format!("/api/epis/{epi_id}"),
        &token,
        &[("ca", "CA-12345")],
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["ca"], json!("CA-12345"));
    assert_eq!(body["data"]["lifespan"], json!(12));

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/api/epis/{epi_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"].as_str().unwrap(), epi_id);
}

#[tokio::test]
async fn estoques_movimentos_e_saldo_agregado() {
    let Some(app) = test_app().await else { return };

    let token = register_user(&app, "Almoxarife").await;
    let workspace = create_workspace(&app, &token, "Obra Saldo").await;
    let workspace_id = workspace["id"].as_str().unwrap().to_string();

    let create_estoque = |name: &str, tipo: &str| {
        json!({
            "name": name,
            "type": tipo,
            "location": "Canteiro A",
            "capacity": "500",
            "workspaceId": workspace_id,
        })
    };

    let (status, body) = send(
        &app,
        "POST",
        "/api/estoques",
        Some(&token),
        Some(create_estoque("Central", "Central")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "criação de estoque falhou: {body}");
    let origem_id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["capacity"], json!(500));

    let (_, body) = send(
        &app,
        "POST",
        "/api/estoques",
        Some(&token),
        Some(create_estoque("Obra Norte", "Obra")),
    )
    .await;
    let destino_id = body["data"]["id"].as_str().unwrap().to_string();

    let epi_id = Uuid::new_v4().to_string();

    let movimento = |tipo: &str, quantity: i64, destino: Option<&str>| {
        let mut value = json!({
            "estoqueId": origem_id,
            "epiId": epi_id,
            "epiName": "Capacete",
            "type": tipo,
            "quantity": quantity,
            "workspaceId": workspace_id,
        });
        if let Some(destino) = destino {
            value["destinationEstoqueId"] = json!(destino);
        }
        value
    };

    // Entrada 10, Saída 3, Ajuste 5, Transferência 4 para o destino
    for (tipo, quantidade, destino) in [
        ("Entrada", 10, None),
        ("Saída", 3, None),
        ("Ajuste", 5, None),
        ("Transferência", 4, Some(destino_id.as_str())),
    ] {
        let (status, body) = send(
            &app,
            "POST",
            "/api/estoques/movements",
            Some(&token),
            Some(movimento(tipo, quantidade, destino)),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "movimento {tipo} falhou: {body}");
    }

    // Origem: 10 - 3 + 5 - 4 = 8
    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/estoques/{origem_id}/stock"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let stock = body["data"]["stock"].as_array().unwrap();
    assert_eq!(stock.len(), 1);
    assert_eq!(stock[0]["epiId"].as_str().unwrap(), epi_id);
    assert_eq!(stock[0]["quantity"], json!(8));
    assert!(stock[0]["lastMovement"].is_string());

    // Destino: credita os 4 transferidos
    let (_, body) = send(
        &app,
        "GET",
        &format!("/api/estoques/{destino_id}/stock"),
        Some(&token),
        None,
    )
    .await;
    let stock = body["data"]["stock"].as_array().unwrap();
    assert_eq!(stock.len(), 1);
    assert_eq!(stock[0]["quantity"], json!(4));
    // O nome vem desnormalizado do movimento, já que o EPI não existe no catálogo
    assert_eq!(stock[0]["epiName"], json!("Capacete"));

    // Transferência sem destino só debita a origem
    let (status, _) = send(
        &app,
        "POST",
        "/api/estoques/movements",
        Some(&token),
        Some(movimento("Transferência", 2, None)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = send(
        &app,
        "GET",
        &format!("/api/estoques/{origem_id}/stock"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body["data"]["stock"][0]["quantity"], json!(6));

    // Listagem de movimentações: mais recentes primeiro
    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/estoques/{origem_id}/movements"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], json!(5));
    assert_eq!(body["data"]["documents"][0]["type"], json!("Transferência"));

    // Excluir o estoque de origem não apaga o livro-razão: o destino
    // continua enxergando o crédito da transferência
    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/estoques/{origem_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(
        &app,
        "GET",
        &format!("/api/estoques/{destino_id}/stock"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body["data"]["stock"][0]["quantity"], json!(4));

    // E o estoque excluído passa a responder 404
    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/estoques/{origem_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn valor_de_movimento_aceita_string_e_vazio() {
    let Some(app) = test_app().await else { return };

    let token = register_user(&app, "Compradora").await;
    let workspace = create_workspace(&app, &token, "Obra Valores").await;
    let workspace_id = workspace["id"].as_str().unwrap();

    let (_, body) = send(
        &app,
        "POST",
        "/api/estoques",
        Some(&token),
        Some(json!({
            "name": "Depósito",
            "type": "Central",
            "location": "Galpão 2",
            "workspaceId": workspace_id,
        })),
    )
    .await;
    let estoque_id = body["data"]["id"].as_str().unwrap().to_string();

    let base = |value: Value| {
        json!({
            "estoqueId": estoque_id,
            "epiId": Uuid::new_v4().to_string(),
            "type": "Entrada",
            "quantity": "7",
            "value": value,
            "workspaceId": workspace_id,
        })
    };

    // Valor como string numérica
    let (status, body) = send(
        &app,
        "POST",
        "/api/estoques/movements",
        Some(&token),
        Some(base(json!("150.75"))),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "movimento falhou: {body}");
    assert_eq!(body["data"]["quantity"], json!(7));
    assert_eq!(body["data"]["value"], json!(150.75));

    // Valor vazio vira zero
    let (status, body) = send(
        &app,
        "POST",
        "/api/estoques/movements",
        Some(&token),
        Some(base(json!(""))),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["value"], json!(0.0));

    // Quantidade zero é rejeitada
    let (status, body) = send(
        &app,
        "POST",
        "/api/estoques/movements",
        Some(&token),
        Some(json!({
            "estoqueId": estoque_id,
            "epiId": Uuid::new_v4().to_string(),
            "type": "Entrada",
            "quantity": 0,
            "workspaceId": workspace_id,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"]["quantity"].is_array());
}
